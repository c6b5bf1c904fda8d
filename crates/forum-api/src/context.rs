//! Per-request context carried in request extensions.

use std::time::Instant;

use chrono::{DateTime, Utc};

use forum_auth::Principal;

/// State scoped to one request.
///
/// Inserted by the outermost middleware and filled in by the
/// authentication middleware; handlers read it through extractors.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Monotonic instant the request entered the stack.
    pub started_at: Instant,
    /// Wall-clock time the request was received.
    pub received_at: DateTime<Utc>,
    /// Authenticated caller, if any.
    pub principal: Option<Principal>,
    /// Bearer token the principal was established from.
    pub token: Option<String>,
}

impl RequestContext {
    /// Creates an anonymous context starting now.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            received_at: Utc::now(),
            principal: None,
            token: None,
        }
    }

    /// Marks the request as authenticated.
    pub fn authenticate(&mut self, principal: Principal, token: String) {
        self.principal = Some(principal);
        self.token = Some(token);
    }

    /// Whether a principal was established.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
