use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;

use postflow_core::ServiceError;
use postflow_core::domain::{Platform, PlatformContent, PostContent};
use postflow_core::ports::ContentGenerator;

use super::ApiClient;
use super::wire::{
    CaptionsRequest, CaptionsResponse, HashtagsRequest, HashtagsResponse, ImageRequest,
    ImageResponse,
};

/// AI content endpoints: `regenerate-captions`, `regenerate-hashtags` and
/// `generate-image`.
pub struct HttpContentGenerator {
    api: ApiClient,
}

impl HttpContentGenerator {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn regenerate_captions(
        &self,
        content: &PostContent,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, PlatformContent>, ServiceError> {
        let request = CaptionsRequest {
            post_content: content,
            platforms,
        };
        let body: CaptionsResponse = self
            .api
            .send_json(
                self.api
                    .request(Method::POST, "regenerate-captions")
                    .json(&request),
            )
            .await?;

        // Platforms that were not asked for are dropped.
        Ok(body
            .platforms
            .into_iter()
            .filter_map(|(key, content)| Some((key.parse::<Platform>().ok()?, content)))
            .filter(|(platform, _)| platforms.contains(platform))
            .collect())
    }

    async fn regenerate_hashtags(
        &self,
        platform: Platform,
        caption: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let request = HashtagsRequest {
            platforms: [platform],
            caption,
        };
        let mut body: HashtagsResponse = self
            .api
            .send_json(
                self.api
                    .request(Method::POST, "regenerate-hashtags")
                    .json(&request),
            )
            .await?;

        body.platforms
            .remove(platform.as_str())
            .map(|entry| entry.hashtags)
            .ok_or_else(|| ServiceError::Decode(format!("no hashtags returned for {platform}")))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = ImageRequest {
            ai_image_prompt: prompt,
        };
        let body: ImageResponse = self
            .api
            .send_json(self.api.request(Method::POST, "generate-image").json(&request))
            .await?;

        if body.image_url.trim().is_empty() {
            return Err(ServiceError::Decode("empty image URL".into()));
        }
        Ok(body.image_url)
    }
}
