//! Schedule merger - upsert per-platform publish times into a post's
//! schedule.
//!
//! Unlike regeneration, scheduling is all-or-nothing: any failed upstream
//! call aborts the operation and leaves the stored schedule untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entitlement::{EntitlementGate, VerdictCache, ensure_allowed};
use crate::domain::{Platform, PostId, PostSchedule, ScheduleEntry};
use crate::error::DomainError;
use crate::ports::{AccountService, PostPatch, PostRepository};

/// Timezone used when neither the request nor the post names one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Which platforms a schedule or publish request targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "platforms", rename_all = "snake_case")]
pub enum PlatformScope {
    Selected(BTreeSet<Platform>),
    /// Every platform the account currently has credentials for.
    AllConnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub scope: PlatformScope,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    Scheduled {
        platforms: BTreeSet<Platform>,
        schedule: PostSchedule,
    },
    /// "All connected platforms" resolved to nothing; nothing was written.
    NoConnectedPlatforms,
}

#[derive(Clone)]
pub struct ScheduleMerger {
    gate: EntitlementGate,
    accounts: Arc<dyn AccountService>,
    posts: Arc<dyn PostRepository>,
}

impl ScheduleMerger {
    pub fn new(
        gate: EntitlementGate,
        accounts: Arc<dyn AccountService>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            gate,
            accounts,
            posts,
        }
    }

    /// Upsert `platforms` at `scheduled_at` into `existing`.
    ///
    /// An entry with the same `(platform, scheduled_at)` key is replaced by a
    /// fresh pending one; every other entry is kept as it is and in order.
    pub fn merge(
        existing: &[ScheduleEntry],
        platforms: &BTreeSet<Platform>,
        scheduled_at: DateTime<Utc>,
        timezone: &str,
    ) -> Vec<ScheduleEntry> {
        let mut entries: Vec<ScheduleEntry> = existing
            .iter()
            .filter(|e| !(platforms.contains(&e.platform) && e.scheduled_at == scheduled_at))
            .cloned()
            .collect();

        entries.extend(
            platforms
                .iter()
                .map(|p| ScheduleEntry::pending(*p, scheduled_at, timezone)),
        );
        entries
    }

    pub async fn schedule(
        &self,
        cache: &mut VerdictCache,
        post_id: &PostId,
        request: &ScheduleRequest,
    ) -> Result<ScheduleOutcome, DomainError> {
        let scheduled_at = request
            .scheduled_at
            .ok_or_else(|| DomainError::validation("schedule date and time are required"))?;
        if let PlatformScope::Selected(platforms) = &request.scope {
            if platforms.is_empty() {
                return Err(DomainError::validation("select at least one platform"));
            }
        }
        if request.timezone.as_deref().is_some_and(|tz| tz.trim().is_empty()) {
            return Err(DomainError::validation("timezone must not be blank"));
        }

        ensure_allowed(self.gate.check(cache, false).await)?;

        let platforms = match &request.scope {
            PlatformScope::Selected(platforms) => platforms.clone(),
            PlatformScope::AllConnected => {
                let connected = self.accounts.connected_platforms().await?;
                if connected.is_empty() {
                    tracing::info!(post_id = %post_id, "No connected platforms to schedule");
                    return Ok(ScheduleOutcome::NoConnectedPlatforms);
                }
                connected
            }
        };

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "post",
                id: post_id.to_string(),
            })?;

        let timezone = request
            .timezone
            .clone()
            .or_else(|| post.schedule.timezone.clone())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        let schedule = PostSchedule {
            timezone: post.schedule.timezone.clone().or(Some(timezone.clone())),
            entries: Self::merge(&post.schedule.entries, &platforms, scheduled_at, &timezone),
        };

        let stored = self
            .posts
            .update(post_id, PostPatch::Schedule(schedule))
            .await?;

        tracing::info!(
            post_id = %post_id,
            platforms = platforms.len(),
            %scheduled_at,
            timezone = %timezone,
            "Post scheduled"
        );

        Ok(ScheduleOutcome::Scheduled {
            platforms,
            schedule: stored.schedule,
        })
    }
}
