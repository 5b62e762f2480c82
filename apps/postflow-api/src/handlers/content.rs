//! Regeneration and image variant handlers.

use actix_web::{HttpResponse, web};

use postflow_core::domain::PostId;
use postflow_core::services::RegenerationRequest;
use postflow_shared::ApiResponse;
use postflow_shared::dto::{
    ImageResponse, PostResponse, RegenerateRequest, RegenerateResponse, SelectImageRequest,
};

use crate::middleware::auth::BearerToken;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/regenerate
pub async fn regenerate(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
    body: web::Json<RegenerateRequest>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let request: RegenerationRequest = body.into_inner().into();
    let mut session = state.sessions.acquire(&token, &post_id)?;

    let outcome = state
        .orchestrator(&token)
        .regenerate(&mut session, &request)
        .await?;

    let response = RegenerateResponse::from(outcome);
    let notice = response.notice();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(response).with_message(notice)))
}

/// POST /api/posts/{id}/images/ensure
///
/// Generates the first image of a post that has none. Attempts are bounded
/// per editing session.
pub async fn ensure_image(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let mut session = state.sessions.acquire(&token, &post_id)?;

    let outcome = state.orchestrator(&token).ensure_image(&mut session).await?;

    let notice = outcome.notice();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ImageResponse { outcome }).with_message(notice)))
}

/// PUT /api/posts/{id}/images/selected
pub async fn select_image(
    state: web::Data<AppState>,
    token: BearerToken,
    path: web::Path<String>,
    body: web::Json<SelectImageRequest>,
) -> AppResult<HttpResponse> {
    let post_id = PostId::new(path.into_inner());
    let session = state.sessions.acquire(&token, &post_id)?;

    let post = state
        .orchestrator(&token)
        .select_image(&session, &body.url)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostResponse { post })))
}
