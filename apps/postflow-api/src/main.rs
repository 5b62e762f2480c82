//! # Postflow API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use postflow_infra::ApiClient;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod test_support;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        upstream = %config.upstream.base_url,
        "Starting Postflow API Server on {}:{}",
        config.host,
        config.port
    );

    let client = ApiClient::new(&config.upstream).map_err(|e| {
        tracing::error!(error = %e, "Failed to build upstream client");
        std::io::Error::other(e.to_string())
    })?;
    let state = AppState::new(client, config.orchestrator).with_session_idle(config.session_idle);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
