//! Upstream stand-ins for handler tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use postflow_core::ServiceError;
use postflow_core::domain::{
    Platform, PlatformContent, Post, PostContent, PostId, PostSchedule, SubscriptionStatus,
};
use postflow_core::ports::{AccountService, ContentGenerator, SocialPublisher};
use postflow_core::services::Ports;
use postflow_infra::InMemoryPostRepository;

use crate::middleware::auth::BearerToken;
use crate::state::PortsProvider;

pub const TOKEN: &str = "test-token";

pub struct StubAccounts {
    pub subscription: Mutex<SubscriptionStatus>,
    pub connected: Mutex<BTreeSet<Platform>>,
    pub reads: AtomicUsize,
}

impl Default for StubAccounts {
    fn default() -> Self {
        Self {
            subscription: Mutex::new(SubscriptionStatus {
                plan_name: Some("Pro".into()),
                is_active: true,
            }),
            connected: Mutex::new(BTreeSet::new()),
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AccountService for StubAccounts {
    async fn current_subscription(&self) -> Result<SubscriptionStatus, ServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.subscription.lock().unwrap().clone())
    }

    async fn connected_platforms(&self) -> Result<BTreeSet<Platform>, ServiceError> {
        Ok(self.connected.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct StubContent;

#[async_trait]
impl ContentGenerator for StubContent {
    async fn regenerate_captions(
        &self,
        _content: &PostContent,
        platforms: &[Platform],
    ) -> Result<BTreeMap<Platform, PlatformContent>, ServiceError> {
        Ok(platforms
            .iter()
            .map(|p| {
                (
                    *p,
                    PlatformContent {
                        caption: format!("fresh {p}"),
                        hashtags: vec![format!("#{p}")],
                    },
                )
            })
            .collect())
    }

    async fn regenerate_hashtags(
        &self,
        platform: Platform,
        _caption: &str,
    ) -> Result<Vec<String>, ServiceError> {
        Ok(vec![format!("#{platform}tag")])
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, ServiceError> {
        Ok("https://img.test/1.png".into())
    }
}

#[derive(Default)]
pub struct StubSocial {
    pub failing: Mutex<BTreeSet<Platform>>,
    /// Platform whose publish answers with the suspended-plan signal.
    pub suspends_on: Mutex<Option<Platform>>,
    pub calls: Mutex<Vec<Platform>>,
}

#[async_trait]
impl SocialPublisher for StubSocial {
    async fn publish(&self, _post_id: &PostId, platform: Platform) -> Result<(), ServiceError> {
        self.calls.lock().unwrap().push(platform);
        if *self.suspends_on.lock().unwrap() == Some(platform) {
            return Err(ServiceError::PlanSuspended);
        }
        if self.failing.lock().unwrap().contains(&platform) {
            return Err(ServiceError::Status {
                status: 400,
                message: "token expired".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct StubUpstream {
    pub accounts: Arc<StubAccounts>,
    pub content: Arc<StubContent>,
    pub posts: Arc<InMemoryPostRepository>,
    pub social: Arc<StubSocial>,
}

impl StubUpstream {
    /// Upstream holding one post `p1` with Instagram and X content.
    pub async fn seeded() -> Self {
        let upstream = Self::default();
        let platforms = [Platform::Instagram, Platform::X]
            .into_iter()
            .map(|p| {
                (
                    p,
                    PlatformContent {
                        caption: format!("old {p}"),
                        hashtags: vec![],
                    },
                )
            })
            .collect();
        upstream
            .posts
            .insert(Post {
                id: PostId::new("p1"),
                content: PostContent {
                    platforms,
                    ai_image_prompt: Some("a harbour at dawn".into()),
                    ..Default::default()
                },
                schedule: PostSchedule::default(),
            })
            .await;
        upstream
    }
}

impl PortsProvider for StubUpstream {
    fn ports_for(&self, _token: &BearerToken) -> Ports {
        Ports {
            accounts: self.accounts.clone(),
            content: self.content.clone(),
            posts: self.posts.clone(),
            social: self.social.clone(),
        }
    }
}
