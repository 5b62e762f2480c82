//! In-process port implementations for service tests.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{Platform, PlatformContent, Post, PostContent, PostId, SubscriptionStatus};
use crate::error::ServiceError;
use crate::ports::{AccountService, ContentGenerator, PostPatch, PostRepository, SocialPublisher};

pub fn post_with(id: &str, platforms: &[Platform]) -> Post {
    let platforms = platforms
        .iter()
        .map(|p| {
            (
                *p,
                PlatformContent {
                    caption: format!("old {p} caption"),
                    hashtags: vec![format!("#old{p}")],
                },
            )
        })
        .collect();

    Post {
        id: PostId::new(id),
        content: PostContent {
            platforms,
            ai_image_prompt: Some("a lighthouse at dusk".into()),
            ..Default::default()
        },
        schedule: Default::default(),
    }
}

pub struct FakeAccounts {
    subscription: Mutex<Result<SubscriptionStatus, ServiceError>>,
    connected: Mutex<Result<BTreeSet<Platform>, ServiceError>>,
    subscription_reads: AtomicUsize,
    connected_reads: AtomicUsize,
}

impl Default for FakeAccounts {
    fn default() -> Self {
        Self::with_subscription(SubscriptionStatus {
            plan_name: Some("Pro".into()),
            is_active: true,
        })
    }
}

impl FakeAccounts {
    pub fn with_subscription(status: SubscriptionStatus) -> Self {
        Self {
            subscription: Mutex::new(Ok(status)),
            connected: Mutex::new(Ok(BTreeSet::new())),
            subscription_reads: AtomicUsize::new(0),
            connected_reads: AtomicUsize::new(0),
        }
    }

    pub fn set_subscription(&self, status: Result<SubscriptionStatus, ServiceError>) {
        *self.subscription.lock().unwrap() = status;
    }

    pub fn set_connected(&self, connected: Result<BTreeSet<Platform>, ServiceError>) {
        *self.connected.lock().unwrap() = connected;
    }

    pub fn subscription_reads(&self) -> usize {
        self.subscription_reads.load(Ordering::SeqCst)
    }

    pub fn connected_reads(&self) -> usize {
        self.connected_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountService for FakeAccounts {
    async fn current_subscription(&self) -> Result<SubscriptionStatus, ServiceError> {
        self.subscription_reads.fetch_add(1, Ordering::SeqCst);
        self.subscription.lock().unwrap().clone()
    }

    async fn connected_platforms(&self) -> Result<BTreeSet<Platform>, ServiceError> {
        self.connected_reads.fetch_add(1, Ordering::SeqCst);
        self.connected.lock().unwrap().clone()
    }
}

/// Content generator with scripted failures. Captions come back as
/// `new <platform> caption` with hashtag `#<platform>batch`; explicit hashtag
/// calls return `#<platform>explicit`; images are `img-<n>` unless scripted.
#[derive(Default)]
pub struct FakeContent {
    caption_error: Mutex<Option<ServiceError>>,
    hashtag_errors: Mutex<BTreeMap<Platform, ServiceError>>,
    images: Mutex<VecDeque<Result<String, ServiceError>>>,
    pub caption_calls: Mutex<Vec<Vec<Platform>>>,
    pub hashtag_calls: Mutex<Vec<(Platform, String)>>,
    image_calls: AtomicUsize,
}

impl FakeContent {
    pub fn fail_captions(&self, err: ServiceError) {
        *self.caption_error.lock().unwrap() = Some(err);
    }

    pub fn fail_hashtags(&self, platform: Platform, err: ServiceError) {
        self.hashtag_errors.lock().unwrap().insert(platform, err);
    }

    pub fn push_image(&self, result: Result<String, ServiceError>) {
        self.images.lock().unwrap().push_back(result);
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeContent {
    async fn regenerate_captions(
        &self,
        _content: &PostContent,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, PlatformContent>, ServiceError> {
        self.caption_calls.lock().unwrap().push(platforms.to_vec());
        if let Some(err) = self.caption_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(platforms
            .iter()
            .map(|p| {
                (
                    *p,
                    PlatformContent {
                        caption: format!("new {p} caption"),
                        hashtags: vec![format!("#{p}batch")],
                    },
                )
            })
            .collect())
    }

    async fn regenerate_hashtags(
        &self,
        platform: Platform,
        caption: &str,
    ) -> Result<Vec<String>, ServiceError> {
        self.hashtag_calls
            .lock()
            .unwrap()
            .push((platform, caption.to_string()));
        if let Some(err) = self.hashtag_errors.lock().unwrap().get(&platform) {
            return Err(err.clone());
        }
        Ok(vec![format!("#{platform}explicit")])
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, ServiceError> {
        let n = self.image_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("img-{n}")))
    }
}

#[derive(Default)]
pub struct FakePosts {
    posts: Mutex<HashMap<PostId, Post>>,
    writes: Mutex<Vec<PostPatch>>,
    write_error: Mutex<Option<ServiceError>>,
}

impl FakePosts {
    pub fn with_post(post: Post) -> Self {
        let posts = Self::default();
        posts.insert(post);
        posts
    }

    pub fn insert(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id.clone(), post);
    }

    pub fn get(&self, id: &str) -> Post {
        self.posts.lock().unwrap()[&PostId::new(id)].clone()
    }

    pub fn writes(&self) -> Vec<PostPatch> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_writes(&self, err: ServiceError) {
        *self.write_error.lock().unwrap() = Some(err);
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, ServiceError> {
        Ok(self.posts.lock().unwrap().get(id).cloned())
    }

    async fn update(&self, id: &PostId, patch: PostPatch) -> Result<Post, ServiceError> {
        if let Some(err) = self.write_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.writes.lock().unwrap().push(patch.clone());
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(id).ok_or(ServiceError::NotFound)?;
        patch.apply(post);
        Ok(post.clone())
    }
}

#[derive(Default)]
pub struct FakePublisher {
    failures: Mutex<BTreeMap<Platform, ServiceError>>,
    pub calls: Mutex<Vec<Platform>>,
}

impl FakePublisher {
    pub fn fail(&self, platform: Platform, err: ServiceError) {
        self.failures.lock().unwrap().insert(platform, err);
    }

    pub fn calls(&self) -> Vec<Platform> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialPublisher for FakePublisher {
    async fn publish(&self, _post_id: &PostId, platform: Platform) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(platform);
        match self.failures.lock().unwrap().get(&platform) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
