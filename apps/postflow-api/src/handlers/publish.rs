//! Publishing handlers.

use actix_web::{HttpResponse, web};

use postflow_core::domain::PostId;
use postflow_core::services::PlatformScope;
use postflow_shared::ApiResponse;
use postflow_shared::dto::{PublishRequest, PublishResponse};

use crate::middleware::auth::BearerToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn respond(response: PublishResponse) -> HttpResponse {
    let message = response.message();
    HttpResponse::Ok().json(ApiResponse::ok(response).with_message(Some(message)))
}

/// POST /api/posts/{id}/publish
///
/// Partial success is still a 200; the body names the failed platforms.
pub async fn publish(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
    body: web::Json<PublishRequest>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let request = body.into_inner();
    let mut session = state.sessions.acquire(&token, &post_id)?;
    let orchestrator = state.orchestrator(&token);

    let response: PublishResponse = if request.all_connected {
        orchestrator
            .publish(&mut session, &PlatformScope::AllConnected)
            .await?
            .into()
    } else {
        orchestrator
            .publish_sequence(&mut session, &request.platforms)
            .await?
            .into()
    };

    Ok(respond(response))
}

/// POST /api/posts/{id}/publish/{platform}
pub async fn publish_one(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (id, platform) = path.into_inner();
    let post_id = PostId::new(id);
    let mut session = state.sessions.acquire(&token, &post_id)?;

    let outcome = state
        .orchestrator(&token)
        .publish_one(&mut session, &platform)
        .await?;

    Ok(respond(outcome.into()))
}
