//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use forum_auth::GithubClient;
use forum_cache::CacheManager;
use forum_core::config::{AppConfig, CorsConfig};
use forum_core::error::AppError;
use forum_database::{DatabasePool, PgAccountRepository, migration};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Connects infrastructure, builds the app and serves until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting forum server...");

    // ── Step 1: Shared store ─────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?;

    // ── Step 2: Database ─────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    migration::run_migrations(db.pool()).await?;
    let accounts = Arc::new(PgAccountRepository::new(db.into_pool()));

    // ── Step 3: Identity provider ────────────────────────────────
    let github = Arc::new(GithubClient::new(config.oauth.github.clone())?);

    // ── Step 4: State and app ────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cors = config.server.cors.clone();
    let state = AppState::new(config, cache, accounts, github)?;
    let app = build_app(state, &cors);

    // ── Step 5: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!(%addr, "Forum server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Forum server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
