//! In-memory post store - used by the API tests and local runs without
//! a posts service.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use postflow_core::ServiceError;
use postflow_core::domain::{Post, PostId};
use postflow_core::ports::{PostPatch, PostRepository};

/// Post store backed by a HashMap behind an async RwLock.
/// Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<PostId, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, post: Post) {
        self.posts.write().await.insert(post.id.clone(), post);
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, ServiceError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn update(&self, id: &PostId, patch: PostPatch) -> Result<Post, ServiceError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(id).ok_or(ServiceError::NotFound)?;
        patch.apply(post);
        Ok(post.clone())
    }
}
