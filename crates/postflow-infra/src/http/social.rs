use async_trait::async_trait;
use reqwest::Method;

use postflow_core::ServiceError;
use postflow_core::domain::{Platform, PostId};
use postflow_core::ports::SocialPublisher;

use super::ApiClient;
use super::wire::PublishRequest;

/// Publishing over `social/post`. Any 2xx answer counts as published; the
/// response body is not inspected.
pub struct HttpSocialPublisher {
    api: ApiClient,
}

impl HttpSocialPublisher {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SocialPublisher for HttpSocialPublisher {
    async fn publish(&self, post_id: &PostId, platform: Platform) -> Result<(), ServiceError> {
        let request = PublishRequest { post_id, platform };
        self.api
            .send(self.api.request(Method::POST, "social/post").json(&request))
            .await?;
        Ok(())
    }
}
