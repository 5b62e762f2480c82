//! Multi-platform publisher - publish one post to several platforms and
//! report what succeeded where.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entitlement::{EntitlementGate, VerdictCache, ensure_allowed};
use super::schedule::PlatformScope;
use crate::domain::{Platform, PostId, PublishOutcome};
use crate::error::{DomainError, ServiceError};
use crate::ports::{AccountService, SocialPublisher};

const NOT_ATTEMPTED: &str = "Not attempted: plan suspended";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishRun {
    Completed(PublishOutcome),
    /// "All connected platforms" resolved to nothing; no attempt was made.
    NoConnectedPlatforms,
}

#[derive(Clone)]
pub struct MultiPlatformPublisher {
    gate: EntitlementGate,
    accounts: Arc<dyn AccountService>,
    social: Arc<dyn SocialPublisher>,
}

impl MultiPlatformPublisher {
    pub fn new(
        gate: EntitlementGate,
        accounts: Arc<dyn AccountService>,
        social: Arc<dyn SocialPublisher>,
    ) -> Self {
        Self {
            gate,
            accounts,
            social,
        }
    }

    /// Publish to each platform in order, one at a time. A failed platform is
    /// recorded and the next one is still attempted; nothing is retried. A
    /// suspended-plan answer stops the run immediately and the error carries
    /// the outcome so far.
    pub async fn publish_all(
        &self,
        cache: &mut VerdictCache,
        post_id: &PostId,
        platforms: &[Platform],
    ) -> Result<PublishOutcome, DomainError> {
        if platforms.is_empty() {
            return Err(DomainError::validation("select at least one platform"));
        }
        ensure_allowed(self.gate.check(cache, false).await)?;

        let mut seen = BTreeSet::new();
        let mut outcome = PublishOutcome::default();

        let mut queue = platforms.iter().copied().filter(|p| seen.insert(*p));

        while let Some(platform) = queue.next() {
            match self.social.publish(post_id, platform).await {
                Ok(()) => {
                    tracing::debug!(post_id = %post_id, platform = %platform, "Published");
                    outcome.record_success(platform);
                }
                Err(ServiceError::PlanSuspended) => {
                    outcome.record_failure(platform, ServiceError::PlanSuspended.to_string());
                    for skipped in queue {
                        outcome.record_failure(skipped, NOT_ATTEMPTED);
                    }
                    tracing::warn!(
                        post_id = %post_id,
                        platform = %platform,
                        succeeded = outcome.succeeded.len(),
                        "Plan suspended during publish run"
                    );
                    return Err(DomainError::PlanSuspendedDuringPublish(outcome));
                }
                Err(err) => {
                    tracing::warn!(
                        post_id = %post_id,
                        platform = %platform,
                        error = %err,
                        "Publish failed"
                    );
                    outcome.record_failure(platform, err.to_string());
                }
            }
        }

        tracing::info!(
            post_id = %post_id,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Publish run finished"
        );
        Ok(outcome)
    }

    /// Publish to a single platform given by its key. Unknown keys are
    /// rejected before any network call.
    pub async fn publish_one(
        &self,
        cache: &mut VerdictCache,
        post_id: &PostId,
        platform_key: &str,
    ) -> Result<PublishOutcome, DomainError> {
        let platform: Platform = platform_key.parse()?;
        self.publish_all(cache, post_id, &[platform]).await
    }

    pub async fn publish_scope(
        &self,
        cache: &mut VerdictCache,
        post_id: &PostId,
        scope: &PlatformScope,
    ) -> Result<PublishRun, DomainError> {
        let platforms: Vec<Platform> = match scope {
            PlatformScope::Selected(platforms) => platforms.iter().copied().collect(),
            PlatformScope::AllConnected => {
                ensure_allowed(self.gate.check(cache, false).await)?;
                let connected = self.accounts.connected_platforms().await?;
                if connected.is_empty() {
                    return Ok(PublishRun::NoConnectedPlatforms);
                }
                connected.into_iter().collect()
            }
        };
        self.publish_all(cache, post_id, &platforms)
            .await
            .map(PublishRun::Completed)
    }
}
