//! Domain-level error types.

use thiserror::Error;

use crate::domain::{PublishOutcome, VerdictReason};

/// Domain errors - orchestration failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The account's paid plan is suspended. Recoverable only by the account
    /// holder contacting support; never retried automatically.
    #[error("Plan suspended: contact support to reactivate your subscription")]
    PlanSuspended,

    /// The suspended-plan signal arrived part-way through a publish run.
    /// Carries what was already published; platforms after the signal are
    /// recorded as failed without being attempted.
    #[error("Plan suspended during publishing: {}", .0.summary())]
    PlanSuspendedDuringPublish(PublishOutcome),

    /// Refused for a reason other than a suspended plan (free-tier gate, or
    /// an unverifiable account under a fail-closed policy).
    #[error("Operation not permitted: {0:?}")]
    NotEntitled(VerdictReason),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Upstream call failed: {0}")]
    Upstream(ServiceError),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn is_suspended(&self) -> bool {
        matches!(
            self,
            DomainError::PlanSuspended | DomainError::PlanSuspendedDuringPublish(_)
        )
    }
}

impl From<ServiceError> for DomainError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::PlanSuspended => DomainError::PlanSuspended,
            other => DomainError::Upstream(other),
        }
    }
}

/// Errors returned by external collaborators (ports).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// A 403 response carrying the `{suspendedPlan: true}` body.
    #[error("Plan suspended")]
    PlanSuspended,

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Request rejected with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Resource not found")]
    NotFound,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn is_suspended(&self) -> bool {
        matches!(self, ServiceError::PlanSuspended)
    }
}
