//! Application state - shared across all handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use tokio::sync::{Mutex as SessionLock, OwnedMutexGuard};

use postflow_core::domain::PostId;
use postflow_core::services::Ports;
use postflow_core::{EditingSession, OrchestratorConfig, PostOrchestrator};
use postflow_infra::ApiClient;

use crate::middleware::auth::BearerToken;
use crate::middleware::error::AppError;

/// Builds the ports for one caller. Upstream calls are made with the
/// caller's token.
pub trait PortsProvider: Send + Sync {
    fn ports_for(&self, token: &BearerToken) -> Ports;
}

impl PortsProvider for ApiClient {
    fn ports_for(&self, token: &BearerToken) -> Ports {
        self.with_token(token.as_str()).ports()
    }
}

/// Sessions are keyed by a digest of the caller's token, never the token.
type SessionKey = ([u8; 32], PostId);

/// Idle time after which an unlocked session is forgotten.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

struct SessionSlot {
    session: Arc<SessionLock<EditingSession>>,
    last_used: Instant,
}

impl SessionSlot {
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.session) > 1
    }
}

fn session_key(token: &BearerToken, post_id: &PostId) -> SessionKey {
    (Sha256::digest(token.as_str().as_bytes()).into(), post_id.clone())
}

/// Open editing sessions, one per (caller, post).
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, SessionSlot>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_IDLE)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Lock the session of `token` on `post_id`, creating it on first use.
    /// Fails with a conflict while another mutation holds it. Sessions idle
    /// for longer than the timeout are dropped on the way.
    pub fn acquire(
        &self,
        token: &BearerToken,
        post_id: &PostId,
    ) -> Result<OwnedMutexGuard<EditingSession>, AppError> {
        let now = Instant::now();
        let session = {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| AppError::Internal("session registry poisoned".to_string()))?;

            let before = sessions.len();
            sessions.retain(|_, slot| {
                slot.in_use() || now.duration_since(slot.last_used) <= self.idle_timeout
            });
            if sessions.len() < before {
                tracing::debug!(evicted = before - sessions.len(), "Evicted idle sessions");
            }

            let slot = sessions
                .entry(session_key(token, post_id))
                .or_insert_with(|| SessionSlot {
                    session: Arc::new(SessionLock::new(EditingSession::new(post_id.clone()))),
                    last_used: now,
                });
            slot.last_used = now;
            slot.session.clone()
        };

        session.try_lock_owned().map_err(|_| {
            tracing::debug!(post_id = %post_id, "Rejected concurrent mutation");
            AppError::Conflict("Another change to this post is still in progress".to_string())
        })
    }

    /// Drop the session of `token` on `post_id`. Returns whether one existed.
    pub fn close(&self, token: &BearerToken, post_id: &PostId) -> Result<bool, AppError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| AppError::Internal("session registry poisoned".to_string()))?;
        Ok(sessions.remove(&session_key(token, post_id)).is_some())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or_default()
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    ports: Arc<dyn PortsProvider>,
    config: OrchestratorConfig,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(ports: impl PortsProvider + 'static, config: OrchestratorConfig) -> Self {
        tracing::info!(
            entitlement = ?config.entitlement,
            image_attempts = config.image_retry.max_attempts,
            "Application state initialized"
        );

        Self {
            ports: Arc::new(ports),
            config,
            sessions: Arc::new(SessionRegistry::default()),
        }
    }

    pub fn with_session_idle(mut self, idle_timeout: Duration) -> Self {
        self.sessions = Arc::new(SessionRegistry::new(idle_timeout));
        self
    }

    /// An orchestrator acting on behalf of the holder of `token`.
    pub fn orchestrator(&self, token: &BearerToken) -> PostOrchestrator {
        PostOrchestrator::new(self.ports.ports_for(token), self.config)
    }
}
