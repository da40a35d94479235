//! Course request form server

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crf_api::AppState;
use crf_canvas::{CanvasClient, CanvasService};
use crf_core::config::AppConfig;
use crf_db::{Database, RequestRepository, UserRepository};

mod health;
mod logging;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    let _log_guard = logging::init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        debug = config.canvas.debug,
        "Starting course request form"
    );

    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    info!("Connected to database");

    let client = CanvasClient::from_config(&config.canvas).context("Invalid Canvas configuration")?;
    let canvas = Arc::new(
        CanvasService::new(Arc::new(client), config.canvas.main_account_id)
            .with_terms(config.terms.current, config.terms.next),
    );
    info!(
        current_term = canvas.current_term_code(),
        next_term = canvas.next_term_code(),
        "Canvas configured"
    );

    let health = Arc::new(
        HealthChecker::new(HealthConfig::default())
            .with_database(db.clone())
            .with_canvas(canvas.clone()),
    );

    let addr = config.server_addr();
    let state = AppState::new(
        config,
        canvas,
        Arc::new(UserRepository::new(db.pool().clone())),
        Arc::new(RequestRepository::new(db.pool().clone())),
    );

    let app = build_router(state, health);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>) -> Router {
    // Health check routes (no auth required)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(crf_api::router().with_state(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
