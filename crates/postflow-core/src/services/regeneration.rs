//! Regeneration coordinator - partial regeneration of text, hashtags and
//! image across one or all of a post's platforms.
//!
//! Caption regeneration is one batched request for every target platform.
//! Hashtag regeneration is one request per platform, each seeded with that
//! platform's caption as it was when the request went out. Both batches run
//! together and are merged only once all of them have settled; a failed
//! request leaves its platform's field unchanged instead of failing the
//! whole operation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entitlement::{EntitlementGate, VerdictCache, ensure_allowed};
use super::images::ImageVariantStore;
use super::join::{Settled, settle_all};
use super::retry::{RetryBudget, RetryError, RetryPolicy};
use crate::domain::{
    ImageOutcome, PartialSelection, Platform, PlatformContent, Post, PostId,
    RegenerationSelection,
};
use crate::error::{DomainError, ServiceError};
use crate::ports::{ContentGenerator, PostPatch, PostRepository};

/// A regeneration intent from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerationRequest {
    pub selection: RegenerationSelection,
    /// The platform currently shown in the editor.
    pub active_platform: Platform,
    /// Regenerate for every platform on the post instead of only the active one.
    pub apply_to_all: bool,
}

/// What happened to one field of one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FieldStatus {
    NotRequested,
    /// Replaced by a dedicated regeneration request.
    Regenerated,
    /// Hashtags replaced by the ones returned alongside regenerated captions.
    FromCaptions,
    /// Kept as it was because the request for it failed.
    Unchanged { reason: String },
}

impl FieldStatus {
    pub fn changed(&self) -> bool {
        matches!(self, FieldStatus::Regenerated | FieldStatus::FromCaptions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformReport {
    pub caption: FieldStatus,
    pub hashtags: FieldStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerationReport {
    /// The post after regeneration, as stored.
    pub post: Post,
    pub platforms: BTreeMap<Platform, PlatformReport>,
    pub image: ImageOutcome,
    /// Whether any write reached the post store.
    pub persisted: bool,
}

impl RegenerationReport {
    pub fn notice(&self) -> Option<&'static str> {
        self.image.notice()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegenerationOutcome {
    /// Whole-post regeneration was selected; it is handled by the separate
    /// start-over flow and nothing was done here.
    WholePostRequested,
    Regenerated(RegenerationReport),
}

#[derive(Clone)]
pub struct RegenerationCoordinator {
    gate: EntitlementGate,
    content: Arc<dyn ContentGenerator>,
    posts: Arc<dyn PostRepository>,
    images: ImageVariantStore,
    image_retry: RetryPolicy,
}

impl RegenerationCoordinator {
    pub fn new(
        gate: EntitlementGate,
        content: Arc<dyn ContentGenerator>,
        posts: Arc<dyn PostRepository>,
        images: ImageVariantStore,
        image_retry: RetryPolicy,
    ) -> Self {
        Self {
            gate,
            content,
            posts,
            images,
            image_retry,
        }
    }

    pub async fn regenerate(
        &self,
        cache: &mut VerdictCache,
        post_id: &PostId,
        request: &RegenerationRequest,
    ) -> Result<RegenerationOutcome, DomainError> {
        ensure_allowed(self.gate.check(cache, false).await)?;

        let selection = match request.selection {
            RegenerationSelection::WholePost => {
                tracing::debug!(post_id = %post_id, "Whole-post regeneration deferred");
                return Ok(RegenerationOutcome::WholePostRequested);
            }
            RegenerationSelection::Partial(selection) if selection.is_empty() => {
                return Err(DomainError::validation(
                    "select text, hashtags or image to regenerate",
                ));
            }
            RegenerationSelection::Partial(selection) => selection,
        };

        let mut post = self.load(post_id).await?;
        let targets = resolve_targets(&post, request)?;
        let target_list: Vec<Platform> = targets.iter().copied().collect();

        let (captions, hashtags, image) = futures::join!(
            self.caption_batch(&post, &target_list, selection),
            self.hashtag_batch(&post, &target_list, selection),
            self.image_rendition(&post, selection),
        );

        let suspended = matches!(captions, Some(Err(ServiceError::PlanSuspended)))
            || hashtags.suspended()
            || matches!(image, ImageAttempt::Generated(Err(ServiceError::PlanSuspended)));
        if suspended {
            return Err(DomainError::PlanSuspended);
        }

        let (content, platforms) = merge(&post, &target_list, selection, captions, hashtags);
        let text_changed = platforms
            .values()
            .any(|r| r.caption.changed() || r.hashtags.changed());
        post.content = content;

        let mut persisted = false;
        let image = match image {
            ImageAttempt::NotRequested => ImageOutcome::NotRequested,
            ImageAttempt::AtCap => ImageOutcome::CapReached,
            ImageAttempt::NoPrompt(message) => ImageOutcome::Failed { message },
            ImageAttempt::Generated(Ok(url)) => {
                let outcome = self.images.append(&mut post, url).await?;
                persisted = matches!(outcome, ImageOutcome::Appended { .. });
                outcome
            }
            ImageAttempt::Generated(Err(err)) => {
                tracing::warn!(post_id = %post_id, error = %err, "Image generation failed");
                ImageOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };

        // An appended variant already wrote the merged content.
        if text_changed && !persisted {
            post = self
                .posts
                .update(post_id, PostPatch::Content(post.content.clone()))
                .await?;
            persisted = true;
        }

        tracing::info!(
            post_id = %post_id,
            targets = target_list.len(),
            text_changed,
            persisted,
            "Regeneration finished"
        );

        Ok(RegenerationOutcome::Regenerated(RegenerationReport {
            post,
            platforms,
            image,
            persisted,
        }))
    }

    /// Generate the first image of a post that has none, retrying under the
    /// configured policy. Attempts are charged to `budget`, so repeated calls
    /// within one session never exceed the policy's attempt cap.
    pub async fn ensure_image(
        &self,
        cache: &mut VerdictCache,
        budget: &mut RetryBudget,
        post_id: &PostId,
    ) -> Result<ImageOutcome, DomainError> {
        ensure_allowed(self.gate.check(cache, false).await)?;

        let mut post = self.load(post_id).await?;
        if post.content.selected_image().is_some() {
            return Ok(ImageOutcome::AlreadyPresent);
        }
        let prompt = image_prompt(&post)?.to_string();

        let generated = self
            .image_retry
            .run(budget, || self.content.generate_image(&prompt))
            .await;

        match generated {
            Ok(url) => self.images.append(&mut post, url).await,
            Err(RetryError::Fatal(err)) => Err(err.into()),
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::warn!(
                    post_id = %post_id,
                    attempts,
                    last_error = ?last,
                    "Giving up on image generation"
                );
                Ok(ImageOutcome::GaveUp { attempts })
            }
        }
    }

    async fn load(&self, post_id: &PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "post",
                id: post_id.to_string(),
            })
    }

    async fn caption_batch(
        &self,
        post: &Post,
        targets: &[Platform],
        selection: PartialSelection,
    ) -> Option<Result<BTreeMap<Platform, PlatformContent>, ServiceError>> {
        if !selection.text {
            return None;
        }
        Some(self.content.regenerate_captions(&post.content, targets).await)
    }

    async fn hashtag_batch(
        &self,
        post: &Post,
        targets: &[Platform],
        selection: PartialSelection,
    ) -> Settled<Platform, Vec<String>> {
        if !selection.hashtags {
            return Settled::new();
        }
        let tasks = targets.iter().map(|platform| {
            let caption = post
                .content
                .platforms
                .get(platform)
                .map(|c| c.caption.as_str())
                .unwrap_or_default();
            (*platform, self.content.regenerate_hashtags(*platform, caption))
        });
        settle_all(tasks).await
    }

    async fn image_rendition(&self, post: &Post, selection: PartialSelection) -> ImageAttempt {
        if !selection.image {
            return ImageAttempt::NotRequested;
        }
        if !post.content.can_append_variant() {
            return ImageAttempt::AtCap;
        }
        match image_prompt(post) {
            Ok(prompt) => ImageAttempt::Generated(self.content.generate_image(prompt).await),
            Err(err) => ImageAttempt::NoPrompt(err.to_string()),
        }
    }
}

/// Result of the image leg of a regeneration, before it reaches the store.
enum ImageAttempt {
    NotRequested,
    /// The post already holds the maximum number of variants; no request
    /// was made.
    AtCap,
    NoPrompt(String),
    Generated(Result<String, ServiceError>),
}

fn image_prompt(post: &Post) -> Result<&str, DomainError> {
    post.content
        .ai_image_prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| DomainError::validation("post has no image prompt"))
}

fn resolve_targets(
    post: &Post,
    request: &RegenerationRequest,
) -> Result<BTreeSet<Platform>, DomainError> {
    if request.apply_to_all {
        let all: BTreeSet<Platform> = post.content.platforms.keys().copied().collect();
        if all.is_empty() {
            return Err(DomainError::validation("post has no platform content"));
        }
        return Ok(all);
    }

    if !post.content.platforms.contains_key(&request.active_platform) {
        return Err(DomainError::validation(format!(
            "post has no content for {}",
            request.active_platform
        )));
    }
    Ok(BTreeSet::from([request.active_platform]))
}

/// Fold settled results into a copy of the post content.
///
/// Hashtags from a dedicated hashtag request win over the hashtags that come
/// back with regenerated captions; the latter are used only when the
/// dedicated request was not made or failed.
fn merge(
    post: &Post,
    targets: &[Platform],
    selection: PartialSelection,
    captions: Option<Result<BTreeMap<Platform, PlatformContent>, ServiceError>>,
    hashtags: Settled<Platform, Vec<String>>,
) -> (crate::domain::PostContent, BTreeMap<Platform, PlatformReport>) {
    let mut content = post.content.clone();
    let mut reports = BTreeMap::new();

    let (caption_batch, caption_error) = match captions {
        Some(Ok(batch)) => (batch, None),
        Some(Err(err)) => {
            tracing::warn!(post_id = %post.id, error = %err, "Caption regeneration failed");
            (BTreeMap::new(), Some(err.to_string()))
        }
        None => (BTreeMap::new(), None),
    };

    for platform in targets {
        let Some(entry) = content.platforms.get_mut(platform) else {
            continue;
        };
        let from_batch = caption_batch.get(platform);

        let caption = if !selection.text {
            FieldStatus::NotRequested
        } else if let Some(fresh) = from_batch {
            entry.caption = fresh.caption.clone();
            FieldStatus::Regenerated
        } else {
            FieldStatus::Unchanged {
                reason: caption_error
                    .clone()
                    .unwrap_or_else(|| "no caption returned".to_string()),
            }
        };

        let incidental = from_batch.filter(|fresh| !fresh.hashtags.is_empty());
        let hashtag_status = if let Some(explicit) = hashtags.ok.get(platform) {
            entry.hashtags = explicit.clone();
            FieldStatus::Regenerated
        } else if let Some(fresh) = incidental {
            entry.hashtags = fresh.hashtags.clone();
            FieldStatus::FromCaptions
        } else if let Some(err) = hashtags.failed.get(platform) {
            tracing::warn!(
                post_id = %post.id,
                platform = %platform,
                error = %err,
                "Hashtag regeneration failed"
            );
            FieldStatus::Unchanged {
                reason: err.to_string(),
            }
        } else if selection.hashtags {
            FieldStatus::Unchanged {
                reason: "no hashtags returned".to_string(),
            }
        } else {
            FieldStatus::NotRequested
        };

        reports.insert(
            *platform,
            PlatformReport {
                caption,
                hashtags: hashtag_status,
            },
        );
    }

    (content, reports)
}
