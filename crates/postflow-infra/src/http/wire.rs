//! Request and response bodies of the upstream services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use postflow_core::domain::{
    Platform, PlatformContent, PostContent, PostId, PostSchedule, SubscriptionStatus,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, rename = "suspendedPlan")]
    pub suspended_plan: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

// subscription/current

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionResponse {
    #[serde(default)]
    pub plan: Option<PlanBody>,
    #[serde(default)]
    pub subscription: Option<SubscriptionBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlanBody {
    #[serde(rename = "planName")]
    pub plan_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionBody {
    #[serde(default)]
    pub is_active: bool,
}

impl From<SubscriptionResponse> for SubscriptionStatus {
    fn from(body: SubscriptionResponse) -> Self {
        Self {
            plan_name: body.plan.and_then(|p| p.plan_name),
            is_active: body.subscription.is_some_and(|s| s.is_active),
        }
    }
}

// profile/me

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    #[serde(default, rename = "socialCredentials")]
    pub social_credentials: BTreeMap<String, serde_json::Value>,
}

impl ProfileResponse {
    /// Platforms with a credential entry. Null or `false` entries and keys
    /// of platforms this service does not publish to are skipped.
    pub fn connected(&self) -> impl Iterator<Item = Platform> + '_ {
        self.social_credentials
            .iter()
            .filter(|(_, v)| !v.is_null() && v.as_bool() != Some(false))
            .filter_map(|(k, _)| k.parse().ok())
    }
}

// regenerate-captions / regenerate-hashtags / generate-image

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CaptionsRequest<'a> {
    pub post_content: &'a PostContent,
    pub platforms: &'a [Platform],
}

#[derive(Debug, Deserialize)]
pub(crate) struct CaptionsResponse {
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformContent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HashtagsRequest<'a> {
    pub platforms: [Platform; 1],
    pub caption: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HashtagsResponse {
    #[serde(default)]
    pub platforms: BTreeMap<String, HashtagsBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HashtagsBody {
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageRequest<'a> {
    pub ai_image_prompt: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageResponse {
    pub image_url: String,
}

// posts/{id}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a PostContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<&'a PostSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url_variant: Option<&'a str>,
}

// social/post

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublishRequest<'a> {
    pub post_id: &'a PostId,
    pub platform: Platform,
}
