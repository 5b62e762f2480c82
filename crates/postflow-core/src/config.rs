//! Orchestrator configuration.

use crate::services::{EntitlementPolicy, RetryPolicy};

/// Policies the orchestrator runs with. Loading them from the environment
/// is the application's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub entitlement: EntitlementPolicy,
    /// Policy for automatic image generation on posts that have no image.
    pub image_retry: RetryPolicy,
}
