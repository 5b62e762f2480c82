//! Editing session handlers.

use actix_web::{HttpResponse, web};

use postflow_core::domain::PostId;
use postflow_shared::ApiResponse;
use postflow_shared::dto::SessionResponse;

use crate::middleware::auth::BearerToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/session
///
/// Opens the editing session, or restarts it when the editor reloads. The
/// entitlement verdict is always re-read.
pub async fn open(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let mut session = state.sessions.acquire(&token, &post_id)?;

    let (fresh, verdict) = state
        .orchestrator(&token)
        .open_session(post_id.clone())
        .await;
    *session = fresh;
    tracing::debug!(
        post_id = %post_id,
        allowed = verdict.allowed,
        open_sessions = state.sessions.len(),
        "Editing session opened"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SessionResponse {
        post_id,
        verdict,
        checked_at: session.verdicts().last_computed_at(),
    })))
}

/// DELETE /api/posts/{id}/session
pub async fn close(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    // Refuse while a mutation is still running on the session.
    drop(state.sessions.acquire(&token, &post_id)?);
    state.sessions.close(&token, &post_id)?;
    Ok(HttpResponse::NoContent().finish())
}
