//! Scheduling handler.

use actix_web::{HttpResponse, web};

use postflow_core::domain::PostId;
use postflow_core::services::{ScheduleOutcome, ScheduleRequest};
use postflow_shared::ApiResponse;
use postflow_shared::dto::ScheduleRequestBody;

use crate::middleware::auth::BearerToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/schedule
pub async fn schedule(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
    body: web::Json<ScheduleRequestBody>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let request: ScheduleRequest = body.into_inner().into();
    let mut session = state.sessions.acquire(&token, &post_id)?;

    let outcome = state
        .orchestrator(&token)
        .schedule(&mut session, &request)
        .await?;

    let message = match &outcome {
        ScheduleOutcome::Scheduled { platforms, .. } => {
            format!("Scheduled for {} platform(s)", platforms.len())
        }
        ScheduleOutcome::NoConnectedPlatforms => "No connected platforms to schedule".to_string(),
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(outcome).with_message(Some(message))))
}
