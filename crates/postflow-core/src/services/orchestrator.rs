//! Post orchestrator - wires the lifecycle components to their ports and
//! runs every operation inside an editing session.

use std::sync::Arc;

use crate::config::OrchestratorConfig;
use crate::domain::{EntitlementVerdict, ImageOutcome, Platform, Post, PostId, PublishOutcome};
use crate::error::DomainError;
use crate::ports::{AccountService, ContentGenerator, PostRepository, SocialPublisher};

use super::entitlement::{EntitlementGate, VerdictCache};
use super::images::ImageVariantStore;
use super::publish::{MultiPlatformPublisher, PublishRun};
use super::regeneration::{RegenerationCoordinator, RegenerationOutcome, RegenerationRequest};
use super::retry::RetryBudget;
use super::schedule::{PlatformScope, ScheduleMerger, ScheduleOutcome, ScheduleRequest};

/// The external collaborators an orchestrator runs against.
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountService>,
    pub content: Arc<dyn ContentGenerator>,
    pub posts: Arc<dyn PostRepository>,
    pub social: Arc<dyn SocialPublisher>,
}

/// State of one user editing one post.
///
/// Owns the entitlement cache and the automatic image-generation budget.
/// Operations on a session are expected to run one at a time.
#[derive(Debug, Clone)]
pub struct EditingSession {
    post_id: PostId,
    verdicts: VerdictCache,
    image_attempts: RetryBudget,
}

impl EditingSession {
    pub fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            verdicts: VerdictCache::default(),
            image_attempts: RetryBudget::default(),
        }
    }

    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    pub fn verdicts(&self) -> &VerdictCache {
        &self.verdicts
    }
}

#[derive(Clone)]
pub struct PostOrchestrator {
    gate: EntitlementGate,
    posts: Arc<dyn PostRepository>,
    images: ImageVariantStore,
    regeneration: RegenerationCoordinator,
    schedule: ScheduleMerger,
    publisher: MultiPlatformPublisher,
}

impl PostOrchestrator {
    pub fn new(ports: Ports, config: OrchestratorConfig) -> Self {
        let gate = EntitlementGate::new(ports.accounts.clone(), config.entitlement);
        let images = ImageVariantStore::new(ports.posts.clone());

        Self {
            regeneration: RegenerationCoordinator::new(
                gate.clone(),
                ports.content,
                ports.posts.clone(),
                images.clone(),
                config.image_retry,
            ),
            schedule: ScheduleMerger::new(gate.clone(), ports.accounts.clone(), ports.posts.clone()),
            publisher: MultiPlatformPublisher::new(gate.clone(), ports.accounts, ports.social),
            posts: ports.posts,
            images,
            gate,
        }
    }

    /// Start editing a post. The entitlement verdict is always re-read here,
    /// since the plan may have changed while the user was away.
    pub async fn open_session(&self, post_id: PostId) -> (EditingSession, EntitlementVerdict) {
        let mut session = EditingSession::new(post_id);
        let verdict = self.refresh_entitlement(&mut session).await;
        (session, verdict)
    }

    pub async fn refresh_entitlement(&self, session: &mut EditingSession) -> EntitlementVerdict {
        self.gate.check(&mut session.verdicts, true).await
    }

    pub async fn regenerate(
        &self,
        session: &mut EditingSession,
        request: &RegenerationRequest,
    ) -> Result<RegenerationOutcome, DomainError> {
        self.regeneration
            .regenerate(&mut session.verdicts, &session.post_id, request)
            .await
    }

    pub async fn ensure_image(&self, session: &mut EditingSession) -> Result<ImageOutcome, DomainError> {
        self.regeneration
            .ensure_image(
                &mut session.verdicts,
                &mut session.image_attempts,
                &session.post_id,
            )
            .await
    }

    pub async fn select_image(&self, session: &EditingSession, url: &str) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_id(&session.post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "post",
                id: session.post_id.to_string(),
            })?;
        self.images.select(&mut post, url).await?;
        Ok(post)
    }

    pub async fn schedule(
        &self,
        session: &mut EditingSession,
        request: &ScheduleRequest,
    ) -> Result<ScheduleOutcome, DomainError> {
        self.schedule
            .schedule(&mut session.verdicts, &session.post_id, request)
            .await
    }

    pub async fn publish(
        &self,
        session: &mut EditingSession,
        scope: &PlatformScope,
    ) -> Result<PublishRun, DomainError> {
        self.publisher
            .publish_scope(&mut session.verdicts, &session.post_id, scope)
            .await
    }

    pub async fn publish_sequence(
        &self,
        session: &mut EditingSession,
        platforms: &[Platform],
    ) -> Result<PublishOutcome, DomainError> {
        self.publisher
            .publish_all(&mut session.verdicts, &session.post_id, platforms)
            .await
    }

    pub async fn publish_one(
        &self,
        session: &mut EditingSession,
        platform_key: &str,
    ) -> Result<PublishOutcome, DomainError> {
        self.publisher
            .publish_one(&mut session.verdicts, &session.post_id, platform_key)
            .await
    }
}
