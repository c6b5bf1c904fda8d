//! Bearer token authentication middleware.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use forum_auth::AuthOutcome;

use crate::context::RequestContext;
use crate::state::AppState;

/// Runs the authentication gate and records the principal in the
/// request's [`RequestContext`].
///
/// Never rejects: anonymous requests continue and protected handlers
/// decide for themselves through the `AuthUser` extractor.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let outcome = state.gate.authenticate(header).await;

    if let AuthOutcome::Authenticated { principal, token } = outcome {
        let extensions = request.extensions_mut();
        if extensions.get::<RequestContext>().is_none() {
            extensions.insert(RequestContext::new());
        }
        if let Some(ctx) = extensions.get_mut::<RequestContext>() {
            ctx.authenticate(principal, token);
        }
    }

    next.run(request).await
}
