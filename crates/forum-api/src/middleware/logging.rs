//! Request context and request/response logging middleware.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::context::RequestContext;

/// Inserts a fresh [`RequestContext`] and logs method, path, status, and
/// duration measured from the context's start instant.
pub async fn request_logging(mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let ctx = RequestContext::new();
    let started_at = ctx.started_at;
    request.extensions_mut().insert(ctx);

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %uri.path(),
        status = %response.status().as_u16(),
        duration_ms = %started_at.elapsed().as_millis(),
        "HTTP request"
    );

    response
}
