//! HTTP handlers and route configuration.

mod content;
mod health;
mod publish;
mod schedule;
mod session;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Editing routes, bearer token required
            .service(
                web::scope("/posts/{id}")
                    .route("/session", web::post().to(session::open))
                    .route("/session", web::delete().to(session::close))
                    .route("/regenerate", web::post().to(content::regenerate))
                    .route("/images/ensure", web::post().to(content::ensure_image))
                    .route("/images/selected", web::put().to(content::select_image))
                    .route("/schedule", web::post().to(schedule::schedule))
                    .route("/publish", web::post().to(publish::publish))
                    .route("/publish/{platform}", web::post().to(publish::publish_one)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use postflow_core::OrchestratorConfig;
    use postflow_core::domain::{Platform, PostId, SubscriptionStatus};

    use super::*;
    use crate::middleware::auth::BearerToken;
    use crate::state::AppState;
    use crate::test_support::{StubUpstream, TOKEN};

    fn state(upstream: &StubUpstream) -> AppState {
        AppState::new(upstream.clone(), OrchestratorConfig::default())
    }

    fn authed(req: test::TestRequest) -> test::TestRequest {
        req.insert_header((header::AUTHORIZATION, format!("Bearer {TOKEN}")))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_needs_no_token() {
        let upstream = StubUpstream::default();
        let app = app!(state(&upstream));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn editing_routes_require_a_bearer_token() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = test::TestRequest::post().uri("/api/posts/p1/session").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(upstream.accounts.reads.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn opening_a_session_reports_the_verdict() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/session")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["verdict"]["allowed"], true);
        assert_eq!(body["data"]["verdict"]["reason"], "ok");
        assert!(body["data"]["checkedAt"].is_string());
    }

    #[actix_web::test]
    async fn suspended_plan_blocks_mutations_with_distinguished_body() {
        let upstream = StubUpstream::seeded().await;
        *upstream.accounts.subscription.lock().unwrap() = SubscriptionStatus {
            plan_name: Some("Pro".into()),
            is_active: false,
        };
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/regenerate"))
            .set_json(json!({ "selection": { "text": true }, "activePlatform": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["suspendedPlan"], true);
    }

    #[actix_web::test]
    async fn regenerating_text_persists_the_new_caption() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/regenerate"))
            .set_json(json!({ "selection": { "text": true }, "activePlatform": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["kind"], "regenerated");

        use postflow_core::ports::PostRepository;
        let post = upstream
            .posts
            .find_by_id(&PostId::new("p1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.content.platforms[&Platform::X].caption, "fresh x");
        assert_eq!(post.content.platforms[&Platform::Instagram].caption, "old instagram");
    }

    #[actix_web::test]
    async fn whole_post_selection_is_deferred() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/regenerate"))
            .set_json(json!({ "selection": { "post": true }, "activePlatform": "x" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["kind"], "whole_post_requested");
    }

    #[actix_web::test]
    async fn unknown_platform_is_rejected_before_any_upstream_call() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/publish/myspace")).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(upstream.social.calls.lock().unwrap().is_empty());
        assert_eq!(upstream.accounts.reads.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn schedule_without_date_is_a_bad_request() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/schedule"))
            .set_json(json!({ "platforms": ["x"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(upstream.accounts.reads.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn schedule_all_connected_with_none_connected_is_informational() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/schedule"))
            .set_json(json!({ "allConnected": true, "scheduledAt": "2026-11-02T09:00:00Z" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["kind"], "no_connected_platforms");
        assert_eq!(body["message"], "No connected platforms to schedule");
    }

    #[actix_web::test]
    async fn partial_publish_names_the_failed_platform() {
        let upstream = StubUpstream::seeded().await;
        upstream.social.failing.lock().unwrap().insert(Platform::Facebook);
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/publish"))
            .set_json(json!({ "platforms": ["instagram", "facebook", "x"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["summary"]["kind"], "partial");
        assert_eq!(
            body["message"],
            "Posted to 2 platform(s): instagram, x. Failed on: facebook"
        );
        assert_eq!(
            *upstream.social.calls.lock().unwrap(),
            vec![Platform::Instagram, Platform::Facebook, Platform::X]
        );
    }

    #[actix_web::test]
    async fn suspension_mid_publish_reports_platforms_already_posted() {
        let upstream = StubUpstream::seeded().await;
        *upstream.social.suspends_on.lock().unwrap() = Some(Platform::Facebook);
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/publish"))
            .set_json(json!({ "platforms": ["instagram", "facebook", "x"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["suspendedPlan"], true);
        assert_eq!(body["outcome"]["succeeded"], json!(["instagram"]));
        assert!(body["outcome"]["failed"]["facebook"].is_string());
        assert!(body["outcome"]["failed"]["x"].is_string());
        assert_eq!(
            *upstream.social.calls.lock().unwrap(),
            vec![Platform::Instagram, Platform::Facebook]
        );
    }

    #[actix_web::test]
    async fn selecting_an_unknown_image_is_a_bad_request() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::put().uri("/api/posts/p1/images/selected"))
            .set_json(json!({ "url": "https://img.test/missing.png" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn ensure_image_appends_the_first_variant() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/images/ensure")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["outcome"]["kind"], "appended");
        assert_eq!(body["data"]["outcome"]["url"], "https://img.test/1.png");
    }

    #[actix_web::test]
    async fn concurrent_mutation_on_same_post_conflicts() {
        let upstream = StubUpstream::seeded().await;
        let state = state(&upstream);
        let _busy = state
            .sessions
            .acquire(&BearerToken::new(TOKEN), &PostId::new("p1"))
            .unwrap();
        let app = app!(state.clone());

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/publish/x")).to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(upstream.social.calls.lock().unwrap().is_empty());

        // Other posts are not blocked.
        let req = authed(test::TestRequest::post().uri("/api/posts/p2/session")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn malformed_body_is_problem_details() {
        let upstream = StubUpstream::seeded().await;
        let app = app!(state(&upstream));

        let req = authed(test::TestRequest::post().uri("/api/posts/p1/publish"))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["title"], "Bad Request");
    }

    #[actix_web::test]
    async fn closing_a_session_forgets_it() {
        let upstream = StubUpstream::seeded().await;
        let state = state(&upstream);
        let app = app!(state.clone());

        let open = authed(test::TestRequest::post().uri("/api/posts/p1/session")).to_request();
        test::call_service(&app, open).await;
        assert_eq!(state.sessions.len(), 1);

        let close = authed(test::TestRequest::delete().uri("/api/posts/p1/session")).to_request();
        let resp = test::call_service(&app, close).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len(), 0);
    }
}
