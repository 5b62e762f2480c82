//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use postflow_core::OrchestratorConfig;
use postflow_core::services::{Backoff, EntitlementPolicy, RetryPolicy};
use postflow_infra::UpstreamConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub orchestrator: OrchestratorConfig,
    /// Idle time after which an editing session is dropped.
    pub session_idle: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            upstream: UpstreamConfig::from_env(),
            orchestrator: Self::orchestrator_from_env(),
            session_idle: Duration::from_secs(parse_var("SESSION_IDLE_SECS", 1800)),
        }
    }

    fn orchestrator_from_env() -> OrchestratorConfig {
        let entitlement = match env::var("ENTITLEMENT_FAIL_OPEN") {
            Ok(v) if v == "false" || v == "0" => EntitlementPolicy::FailClosed,
            _ => EntitlementPolicy::FailOpen,
        };

        let image_retry = RetryPolicy {
            max_attempts: parse_var("IMAGE_RETRY_MAX_ATTEMPTS", 3).max(1),
            backoff: Backoff::Exponential {
                initial: Duration::from_millis(parse_var("IMAGE_RETRY_BACKOFF_MS", 500)),
                max: Duration::from_millis(parse_var("IMAGE_RETRY_BACKOFF_MAX_MS", 4000)),
            },
        };

        OrchestratorConfig {
            entitlement,
            image_retry,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
