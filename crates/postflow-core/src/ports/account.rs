use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Platform, SubscriptionStatus};
use crate::error::ServiceError;

/// Account service - subscription state and connected social accounts.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Current plan and subscription activity of the acting account.
    async fn current_subscription(&self) -> Result<SubscriptionStatus, ServiceError>;

    /// Platforms the account holds publishing credentials for.
    async fn connected_platforms(&self) -> Result<BTreeSet<Platform>, ServiceError>;
}
