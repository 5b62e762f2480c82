use async_trait::async_trait;
use reqwest::Method;

use postflow_core::ServiceError;
use postflow_core::domain::{Post, PostId};
use postflow_core::ports::{PostPatch, PostRepository};

use super::ApiClient;
use super::wire::PostUpdate;

/// Posts service over `GET/PUT posts/{id}`.
pub struct HttpPostRepository {
    api: ApiClient,
}

impl HttpPostRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

fn update_body(patch: &PostPatch) -> PostUpdate<'_> {
    match patch {
        PostPatch::Content(content) => PostUpdate {
            content: Some(content),
            ..Default::default()
        },
        PostPatch::Schedule(schedule) => PostUpdate {
            schedule: Some(schedule),
            ..Default::default()
        },
        PostPatch::ContentWithVariant {
            content,
            image_url_variant,
        } => PostUpdate {
            content: Some(content),
            image_url_variant: Some(image_url_variant),
            ..Default::default()
        },
    }
}

#[async_trait]
impl PostRepository for HttpPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, ServiceError> {
        let request = match self.api.request_at(Method::GET, &["posts", id.as_str()]) {
            Ok(request) => request,
            Err(ServiceError::NotFound) => return Ok(None),
            Err(err) => return Err(err),
        };
        match self.api.send_json(request).await {
            Ok(post) => Ok(Some(post)),
            Err(ServiceError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn update(&self, id: &PostId, patch: PostPatch) -> Result<Post, ServiceError> {
        let request = self
            .api
            .request_at(Method::PUT, &["posts", id.as_str()])?
            .json(&update_body(&patch));
        let post: Post = self.api.send_json(request).await?;
        tracing::debug!(post_id = %id, "Post updated upstream");
        Ok(post)
    }
}
