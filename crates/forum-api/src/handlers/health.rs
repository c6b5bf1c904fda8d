//! Health check handler.

use std::time::Duration;

use axum::Json;
use axum::extract::State;

use forum_core::traits::CacheProvider;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// Upper bound on the cache probe.
const CACHE_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let cache = matches!(
        tokio::time::timeout(CACHE_PROBE_TIMEOUT, state.cache.health_check()).await,
        Ok(Ok(true))
    );

    Json(ApiResponse::ok(HealthResponse {
        status: if cache { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache,
    }))
}
