//! Image variant store - the renditions generated for a post.

use std::sync::Arc;

use crate::domain::{ImageOutcome, Post, VariantRejection};
use crate::error::DomainError;
use crate::ports::{PostPatch, PostRepository};

/// Applies variant rules to a post and persists every accepted change.
#[derive(Clone)]
pub struct ImageVariantStore {
    posts: Arc<dyn PostRepository>,
}

impl ImageVariantStore {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Append `url` as the newest rendition and select it.
    ///
    /// Hitting the variant cap is reported as [`ImageOutcome::CapReached`]
    /// and leaves both `post` and the store untouched. On a failed write
    /// `post` is left as it was.
    pub async fn append(&self, post: &mut Post, url: String) -> Result<ImageOutcome, DomainError> {
        let mut content = post.content.clone();
        if let Err(rejection) = content.append_variant(url.clone()) {
            tracing::info!(
                post_id = %post.id,
                reason = rejection.reason(),
                "Image variant not appended"
            );
            return Ok(ImageOutcome::CapReached);
        }

        let patch = PostPatch::ContentWithVariant {
            content,
            image_url_variant: url.clone(),
        };
        *post = self.posts.update(&post.id, patch).await?;

        tracing::info!(
            post_id = %post.id,
            variants = post.content.image_variants.len(),
            "Image variant appended"
        );
        Ok(ImageOutcome::Appended { url })
    }

    /// Select an existing rendition.
    pub async fn select(&self, post: &mut Post, url: &str) -> Result<(), DomainError> {
        let mut content = post.content.clone();
        content
            .select_variant(url)
            .map_err(|rejection: VariantRejection| {
                DomainError::validation(format!("{rejection} ({})", rejection.reason()))
            })?;

        if post.content.selected_image() == Some(url) {
            return Ok(());
        }

        *post = self.posts.update(&post.id, PostPatch::Content(content)).await?;
        tracing::debug!(post_id = %post.id, "Image variant selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Platform;
    use crate::error::ServiceError;
    use crate::services::fakes::{FakePosts, post_with};

    fn store_with(post: Post) -> (Arc<FakePosts>, ImageVariantStore) {
        let posts = Arc::new(FakePosts::with_post(post));
        let store = ImageVariantStore::new(posts.clone());
        (posts, store)
    }

    #[tokio::test]
    async fn first_append_materializes_legacy_image() {
        let mut post = post_with("p1", &[Platform::Instagram]);
        post.content.image_url = Some("u1".into());
        let (posts, store) = store_with(post.clone());

        let outcome = store.append(&mut post, "u2".into()).await.unwrap();

        assert_eq!(outcome, ImageOutcome::Appended { url: "u2".into() });
        assert_eq!(post.content.image_variants, vec!["u1", "u2"]);
        assert_eq!(post.content.selected_image(), Some("u2"));
        assert_eq!(posts.get("p1").content.image_variants, vec!["u1", "u2"]);
        assert!(matches!(
            posts.writes().as_slice(),
            [PostPatch::ContentWithVariant { image_url_variant, .. }] if image_url_variant == "u2"
        ));
    }

    #[tokio::test]
    async fn append_at_cap_is_a_notice_without_write() {
        let mut post = post_with("p1", &[Platform::X]);
        for url in ["a", "b", "c"] {
            post.content.append_variant(url).unwrap();
        }
        let (posts, store) = store_with(post.clone());

        let outcome = store.append(&mut post, "d".into()).await.unwrap();

        assert_eq!(outcome, ImageOutcome::CapReached);
        assert_eq!(post.content.image_variants.len(), 3);
        assert!(posts.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_post_unchanged() {
        let mut post = post_with("p1", &[Platform::X]);
        let (posts, store) = store_with(post.clone());
        posts.fail_writes(ServiceError::Transport("reset".into()));

        let before = post.clone();
        assert!(store.append(&mut post, "u".into()).await.is_err());
        assert_eq!(post, before);
    }

    #[tokio::test]
    async fn select_rejects_unknown_variant_before_any_write() {
        let mut post = post_with("p1", &[Platform::X]);
        post.content.append_variant("a").unwrap();
        let (posts, store) = store_with(post.clone());

        let err = store.select(&mut post, "nope").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("unknown-variant")));
        assert!(posts.writes().is_empty());
    }

    #[tokio::test]
    async fn select_persists_earlier_variant() {
        let mut post = post_with("p1", &[Platform::X]);
        post.content.append_variant("a").unwrap();
        post.content.append_variant("b").unwrap();
        let (posts, store) = store_with(post.clone());

        store.select(&mut post, "a").await.unwrap();

        assert_eq!(post.content.selected_image(), Some("a"));
        assert_eq!(posts.get("p1").content.selected_image(), Some("a"));
    }
}
