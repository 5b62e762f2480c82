use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::{Platform, PlatformContent, PostContent};
use crate::error::ServiceError;

/// AI content services. Each call is an opaque request/response; the
/// generation itself happens upstream.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Regenerate captions for several platforms in one request. The response
    /// also carries fresh hashtags per platform.
    async fn regenerate_captions(
        &self,
        content: &PostContent,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, PlatformContent>, ServiceError>;

    /// Regenerate hashtags for one platform from a caption snapshot.
    async fn regenerate_hashtags(
        &self,
        platform: Platform,
        caption: &str,
    ) -> Result<Vec<String>, ServiceError>;

    /// Produce one new image rendition, returning its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, ServiceError>;
}
