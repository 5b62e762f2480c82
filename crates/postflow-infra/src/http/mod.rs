//! Upstream service adapters over HTTP.
//!
//! One [`ApiClient`] is shared by all adapters. It is cheap to clone and
//! carries the bearer token of the user on whose behalf calls are made.

mod account;
mod content;
mod posts;
mod social;
mod wire;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use postflow_core::ServiceError;
use postflow_core::services::Ports;

pub use account::HttpAccountService;
pub use content::HttpContentGenerator;
pub use posts::HttpPostRepository;
pub use social::HttpSocialPublisher;

/// Upstream connection configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL every service path is resolved against
    /// (e.g., http://localhost:5000/api)
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl UpstreamConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            timeout: Duration::from_secs(
                std::env::var("UPSTREAM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// A client acting on behalf of the holder of `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// All four ports backed by this client.
    pub fn ports(&self) -> Ports {
        Ports {
            accounts: Arc::new(HttpAccountService::new(self.clone())),
            content: Arc::new(HttpContentGenerator::new(self.clone())),
            posts: Arc::new(HttpPostRepository::new(self.clone())),
            social: Arc::new(HttpSocialPublisher::new(self.clone())),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.authorize(self.client.request(method, url))
    }

    /// A request to the base URL extended by `segments`, each one
    /// percent-encoded as a single path segment. Empty and dot segments
    /// name nothing and answer `NotFound` without a call.
    fn request_at(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ServiceError> {
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(ServiceError::NotFound);
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::Transport(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Transport("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(self.authorize(self.client.request(method, url)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = classify(status, &body);
        tracing::debug!(status = status.as_u16(), error = %err, "Upstream call rejected");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ServiceError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Transport(format!("timed out: {err}"))
    } else {
        ServiceError::Transport(err.to_string())
    }
}

/// Map a non-2xx response to a port error. A 403 carrying
/// `{suspendedPlan: true}` is the suspended-plan signal; any other 403 is an
/// ordinary rejection.
fn classify(status: StatusCode, body: &str) -> ServiceError {
    let parsed = serde_json::from_str::<wire::ErrorBody>(body).ok();

    if status == StatusCode::FORBIDDEN && parsed.as_ref().is_some_and(|b| b.suspended_plan) {
        return ServiceError::PlanSuspended;
    }
    if status == StatusCode::NOT_FOUND {
        return ServiceError::NotFound;
    }

    let message = parsed
        .and_then(|b| b.message.or(b.error))
        .or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    ServiceError::Status {
        status: status.as_u16(),
        message,
    }
}
