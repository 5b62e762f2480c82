use async_trait::async_trait;

use crate::domain::{Post, PostContent, PostId, PostSchedule};
use crate::error::ServiceError;

/// Partial update of a post record. The store replaces only the named parts.
#[derive(Debug, Clone, PartialEq)]
pub enum PostPatch {
    Content(PostContent),
    Schedule(PostSchedule),
    /// Content together with the rendition that was just appended to it.
    ContentWithVariant {
        content: PostContent,
        image_url_variant: String,
    },
}

impl PostPatch {
    /// Apply the patch to an in-memory record the way the store does.
    pub fn apply(self, post: &mut Post) {
        match self {
            PostPatch::Content(content) => post.content = content,
            PostPatch::Schedule(schedule) => post.schedule = schedule,
            PostPatch::ContentWithVariant { content, .. } => post.content = content,
        }
    }
}

/// Durable store for post records.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its ID.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, ServiceError>;

    /// Apply a partial update and return the stored record.
    async fn update(&self, id: &PostId, patch: PostPatch) -> Result<Post, ServiceError>;
}
