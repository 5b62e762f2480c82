//! Error handling middleware - RFC 7807 compliant responses.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use postflow_core::domain::{PublishOutcome, VerdictReason};
use postflow_core::{DomainError, ServiceError};
use postflow_shared::ErrorResponse;

const SUSPENDED_NOTICE: &str =
    "Your plan is suspended. Contact support to reactivate your subscription.";

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    /// The account's plan is suspended. Answered with the distinguished
    /// `{suspendedPlan: true}` body.
    PlanSuspended,
    /// Suspended part-way through publishing; the body also carries what was
    /// already posted.
    PlanSuspendedDuringPublish(PublishOutcome),
    Forbidden(VerdictReason),
    Conflict(String),
    /// An upstream service failed or rejected the call.
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::PlanSuspended => write!(f, "Plan suspended"),
            AppError::PlanSuspendedDuringPublish(outcome) => {
                write!(f, "Plan suspended during publishing: {}", outcome.summary())
            }
            AppError::Forbidden(reason) => write!(f, "Forbidden: {:?}", reason),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadGateway(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PlanSuspended
            | AppError::PlanSuspendedDuringPublish(_)
            | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => {
                ErrorResponse::new(401, "Authentication Required").with_detail(detail)
            }
            AppError::PlanSuspended => ErrorResponse::suspended_plan(SUSPENDED_NOTICE),
            AppError::PlanSuspendedDuringPublish(outcome) => {
                let detail = match outcome.succeeded.len() {
                    0 => SUSPENDED_NOTICE.to_string(),
                    _ => format!("{SUSPENDED_NOTICE} {}", outcome.summary()),
                };
                ErrorResponse::suspended_plan(detail).with_outcome(outcome.clone())
            }
            AppError::Forbidden(reason) => {
                let reason = serde_json::to_value(reason)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
                ErrorResponse::forbidden().with_reason(reason)
            }
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::BadGateway(detail) => ErrorResponse::bad_gateway(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::PlanSuspended => AppError::PlanSuspended,
            DomainError::PlanSuspendedDuringPublish(outcome) => {
                AppError::PlanSuspendedDuringPublish(outcome)
            }
            DomainError::NotEntitled(reason) => AppError::Forbidden(reason),
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Upstream(err) => err.into(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::PlanSuspended => AppError::PlanSuspended,
            ServiceError::NotFound => AppError::NotFound("Resource not found".to_string()),
            other => {
                tracing::warn!(error = %other, "Upstream call failed");
                AppError::BadGateway(other.to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
