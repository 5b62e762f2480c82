use async_trait::async_trait;

use crate::domain::{Platform, PostId};
use crate::error::ServiceError;

/// Publishes a stored post to a single social platform.
#[async_trait]
pub trait SocialPublisher: Send + Sync {
    async fn publish(&self, post_id: &PostId, platform: Platform) -> Result<(), ServiceError>;
}
