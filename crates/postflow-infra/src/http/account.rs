use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Method;

use postflow_core::ServiceError;
use postflow_core::domain::{Platform, SubscriptionStatus};
use postflow_core::ports::AccountService;

use super::ApiClient;
use super::wire::{ProfileResponse, SubscriptionResponse};

/// Account service over `subscription/current` and `profile/me`.
pub struct HttpAccountService {
    api: ApiClient,
}

impl HttpAccountService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn current_subscription(&self) -> Result<SubscriptionStatus, ServiceError> {
        let body: SubscriptionResponse = self
            .api
            .send_json(self.api.request(Method::GET, "subscription/current"))
            .await?;
        Ok(body.into())
    }

    async fn connected_platforms(&self) -> Result<BTreeSet<Platform>, ServiceError> {
        let body: ProfileResponse = self
            .api
            .send_json(self.api.request(Method::GET, "profile/me"))
            .await?;
        Ok(body.connected().collect())
    }
}
