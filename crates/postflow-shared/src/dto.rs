//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use postflow_core::domain::{
    EntitlementVerdict, ImageOutcome, Platform, Post, PostId, PublishOutcome, PublishSummary,
    RegenerationSelection,
};
use postflow_core::services::{
    PlatformScope, PublishRun, RegenerationOutcome, RegenerationReport, RegenerationRequest,
    ScheduleRequest,
};

/// Entitlement state of a freshly opened (or refreshed) editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub post_id: PostId,
    pub verdict: EntitlementVerdict,
    pub checked_at: Option<DateTime<Utc>>,
}

/// Request to regenerate parts of a post. `selection` uses the four-flag
/// shape `{text, hashtags, image, post}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub selection: RegenerationSelection,
    pub active_platform: Platform,
    #[serde(default)]
    pub apply_to_all: bool,
}

impl From<RegenerateRequest> for RegenerationRequest {
    fn from(req: RegenerateRequest) -> Self {
        Self {
            selection: req.selection,
            active_platform: req.active_platform,
            apply_to_all: req.apply_to_all,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegenerateResponse {
    /// The editor should switch to the start-over flow.
    WholePostRequested,
    Regenerated(RegenerationReport),
}

impl From<RegenerationOutcome> for RegenerateResponse {
    fn from(outcome: RegenerationOutcome) -> Self {
        match outcome {
            RegenerationOutcome::WholePostRequested => Self::WholePostRequested,
            RegenerationOutcome::Regenerated(report) => Self::Regenerated(report),
        }
    }
}

impl RegenerateResponse {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Self::WholePostRequested => None,
            Self::Regenerated(report) => report.notice(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectImageRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post: Post,
}

/// Request to schedule a post. Either name `platforms` or set
/// `allConnected`; the latter wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequestBody {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub all_connected: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub timezone: Option<String>,
}

impl From<ScheduleRequestBody> for ScheduleRequest {
    fn from(body: ScheduleRequestBody) -> Self {
        let scope = if body.all_connected {
            PlatformScope::AllConnected
        } else {
            PlatformScope::Selected(body.platforms.into_iter().collect())
        };
        Self {
            scope,
            scheduled_at: body.scheduled_at,
            timezone: body.timezone,
        }
    }
}

/// Request to publish a post now. Explicit platforms are attempted in the
/// order given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub all_connected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishResponse {
    Completed {
        outcome: PublishOutcome,
        summary: PublishSummary,
    },
    NoConnectedPlatforms,
}

impl PublishResponse {
    pub fn message(&self) -> String {
        match self {
            Self::Completed { summary, .. } => summary.to_string(),
            Self::NoConnectedPlatforms => "No connected platforms to publish to".to_string(),
        }
    }
}

impl From<PublishOutcome> for PublishResponse {
    fn from(outcome: PublishOutcome) -> Self {
        let summary = outcome.summary();
        Self::Completed { outcome, summary }
    }
}

impl From<PublishRun> for PublishResponse {
    fn from(run: PublishRun) -> Self {
        match run {
            PublishRun::Completed(outcome) => outcome.into(),
            PublishRun::NoConnectedPlatforms => Self::NoConnectedPlatforms,
        }
    }
}
