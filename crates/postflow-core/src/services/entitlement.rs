//! Entitlement gate - may the acting account mutate posts right now?

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{EntitlementVerdict, VerdictReason};
use crate::error::{DomainError, ServiceError};
use crate::ports::AccountService;

/// What the gate answers when the account service cannot be reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntitlementPolicy {
    /// Allow the operation. A transient network error never blocks
    /// legitimate use.
    #[default]
    FailOpen,
    /// Refuse the operation with reason `unverified`.
    FailClosed,
}

/// Last verdict computed for one editing session.
///
/// There is no expiry: the owner calls [`VerdictCache::invalidate`] or asks
/// the gate for a forced refresh after anything that may have changed the
/// plan externally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictCache {
    verdict: Option<EntitlementVerdict>,
    last_computed_at: Option<DateTime<Utc>>,
}

impl VerdictCache {
    pub fn get(&self) -> Option<EntitlementVerdict> {
        self.verdict
    }

    pub fn last_computed_at(&self) -> Option<DateTime<Utc>> {
        self.last_computed_at
    }

    pub fn invalidate(&mut self) {
        self.verdict = None;
        self.last_computed_at = None;
    }

    fn store(&mut self, verdict: EntitlementVerdict) {
        self.verdict = Some(verdict);
        self.last_computed_at = Some(Utc::now());
    }
}

#[derive(Clone)]
pub struct EntitlementGate {
    accounts: Arc<dyn AccountService>,
    policy: EntitlementPolicy,
}

impl EntitlementGate {
    pub fn new(accounts: Arc<dyn AccountService>, policy: EntitlementPolicy) -> Self {
        Self { accounts, policy }
    }

    /// Return the cached verdict, or read the subscription when there is
    /// none or `force_refresh` is set. Every completed read, successful or
    /// not, overwrites the cache.
    pub async fn check(&self, cache: &mut VerdictCache, force_refresh: bool) -> EntitlementVerdict {
        if !force_refresh {
            if let Some(verdict) = cache.get() {
                tracing::debug!(?verdict, "Entitlement verdict served from cache");
                return verdict;
            }
        }

        let verdict = match self.accounts.current_subscription().await {
            Ok(status) => EntitlementVerdict::from_subscription(&status),
            Err(ServiceError::PlanSuspended) => EntitlementVerdict::suspended(),
            Err(err) => match self.policy {
                EntitlementPolicy::FailOpen => {
                    tracing::warn!(error = %err, "Subscription check failed, allowing operation");
                    EntitlementVerdict::ok()
                }
                EntitlementPolicy::FailClosed => {
                    tracing::warn!(error = %err, "Subscription check failed, refusing operation");
                    EntitlementVerdict::unverified()
                }
            },
        };

        tracing::debug!(?verdict, force_refresh, "Entitlement verdict computed");
        cache.store(verdict);
        verdict
    }

    /// [`check`](Self::check), turned into an error when not allowed.
    pub async fn require(&self, cache: &mut VerdictCache) -> Result<(), DomainError> {
        let verdict = self.check(cache, false).await;
        ensure_allowed(verdict)
    }
}

pub(crate) fn ensure_allowed(verdict: EntitlementVerdict) -> Result<(), DomainError> {
    match verdict {
        EntitlementVerdict { allowed: true, .. } => Ok(()),
        EntitlementVerdict {
            reason: VerdictReason::Suspended,
            ..
        } => Err(DomainError::PlanSuspended),
        EntitlementVerdict { reason, .. } => Err(DomainError::NotEntitled(reason)),
    }
}
