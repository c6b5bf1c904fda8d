//! Route definitions for the forum HTTP API.
//!
//! Routes are mounted under `/api`. Every request passes through the
//! request-logging middleware (outermost) and the authentication
//! middleware before reaching a handler.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(oauth_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authenticate,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/user", get(handlers::auth::current_user))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/logout/all", post(handlers::auth::logout_all))
        .route(
            "/auth/blacklist/status",
            get(handlers::auth::blacklist_status),
        )
}

fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/auth/oauth2/authorize/{provider}",
            get(handlers::oauth::authorize),
        )
        .route(
            "/auth/oauth2/callback/{provider}",
            get(handlers::oauth::callback),
        )
}
