use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Platform;

/// Maximum number of image renditions kept for one post.
pub const MAX_IMAGE_VARIANTS: usize = 3;

/// Opaque post identifier, owned by the post store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post entity - a generated social-media post with its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: PostId,
    pub content: PostContent,
    #[serde(default)]
    pub schedule: PostSchedule,
}

/// Caption and hashtags for a single platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContent {
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Generated content of a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    #[serde(default)]
    pub platforms: BTreeMap<Platform, PlatformContent>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Renditions in generation order; append-only, never longer than
    /// [`MAX_IMAGE_VARIANTS`].
    #[serde(default)]
    pub image_variants: Vec<String>,
    #[serde(default)]
    pub ai_image_prompt: Option<String>,
    /// Fields the store keeps on the record that this crate does not model.
    /// Carried through so a `{content}` write does not drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Why an image-variant mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantRejection {
    #[error("enough images generated for this post")]
    CapReached,
    #[error("image is not one of this post's variants")]
    UnknownVariant,
}

impl VariantRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            VariantRejection::CapReached => "cap-reached",
            VariantRejection::UnknownVariant => "unknown-variant",
        }
    }
}

impl PostContent {
    pub fn selected_image(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn can_append_variant(&self) -> bool {
        self.image_variants.len() < MAX_IMAGE_VARIANTS
    }

    /// Append a new rendition and select it.
    ///
    /// A post that still carries a single legacy `image_url` with no variant
    /// history gets that image recorded as the first variant before the new
    /// one is appended.
    pub fn append_variant(&mut self, url: impl Into<String>) -> Result<(), VariantRejection> {
        if !self.can_append_variant() {
            return Err(VariantRejection::CapReached);
        }
        let url = url.into();

        if self.image_variants.is_empty() {
            if let Some(legacy) = self.image_url.as_ref().filter(|legacy| **legacy != url) {
                self.image_variants.push(legacy.clone());
            }
        }

        self.image_variants.push(url.clone());
        self.image_url = Some(url);
        Ok(())
    }

    /// Re-select a rendition that already exists.
    pub fn select_variant(&mut self, url: &str) -> Result<(), VariantRejection> {
        if !self.image_variants.iter().any(|v| v == url) {
            return Err(VariantRejection::UnknownVariant);
        }
        self.image_url = Some(url.to_string());
        Ok(())
    }
}

/// Publication state of one schedule entry.
///
/// The store may hold states this service does not know about; those are
/// kept verbatim and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Pending,
    Published,
    Failed,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

/// One scheduled publish of the post on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub platform: Platform,
    pub scheduled_at: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub timezone: String,
}

impl ScheduleEntry {
    pub fn pending(platform: Platform, scheduled_at: DateTime<Utc>, timezone: &str) -> Self {
        Self {
            platform,
            scheduled_at,
            status: ScheduleStatus::Pending,
            timezone: timezone.to_string(),
        }
    }

    /// Entries are keyed by `(platform, scheduled_at)`.
    pub fn key(&self) -> (Platform, DateTime<Utc>) {
        (self.platform, self.scheduled_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSchedule {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub entries: Vec<ScheduleEntry>,
}
