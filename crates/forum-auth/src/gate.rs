//! Per-request bearer token authentication.
//!
//! The gate only establishes a principal when the token both verifies and
//! is absent from the revocation store. Every other outcome is anonymous;
//! the reason is kept for logging and never shown to the client.

use std::sync::Arc;

use tracing::{debug, error};

use crate::principal::Principal;
use crate::revocation::RevocationStore;
use crate::token::{TokenCodec, TokenError};

/// Authorization scheme prefix, including the separating space.
const BEARER_PREFIX: &str = "Bearer ";

/// Why a request stayed anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousReason {
    /// No `Authorization: Bearer` header.
    NoToken,
    /// The token failed verification.
    InvalidToken(TokenError),
    /// The token was logged out.
    Revoked,
    /// The revocation store could not be consulted in time.
    StoreUnavailable,
}

/// Result of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No principal; downstream treats the caller as logged out.
    Anonymous(AnonymousReason),
    /// The token is valid and not revoked.
    Authenticated {
        /// Who the caller is.
        principal: Principal,
        /// The bearer token the principal was established from.
        token: String,
    },
}

impl AuthOutcome {
    /// The principal, if authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated { principal, .. } => Some(principal),
            Self::Anonymous(_) => None,
        }
    }
}

/// Decides, per request, whether the caller is authenticated.
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    codec: Arc<TokenCodec>,
    revocation: Arc<RevocationStore>,
}

impl AuthenticationGate {
    /// Creates a gate over the given codec and revocation store.
    pub fn new(codec: Arc<TokenCodec>, revocation: Arc<RevocationStore>) -> Self {
        Self { codec, revocation }
    }

    /// Extracts the token from an `Authorization` header value.
    ///
    /// Only the exact `Bearer <token>` form is accepted.
    pub fn bearer_token(header: Option<&str>) -> Option<&str> {
        header?
            .strip_prefix(BEARER_PREFIX)
            .filter(|token| !token.is_empty())
    }

    /// Authenticates a request from its `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthOutcome {
        match Self::bearer_token(authorization) {
            Some(token) => self.authenticate_token(token).await,
            None => AuthOutcome::Anonymous(AnonymousReason::NoToken),
        }
    }

    /// Store faults and timeouts fail open to anonymous and are logged.
    async fn authenticate_token(&self, token: &str) -> AuthOutcome {
        let claims = match self.codec.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(reason = %e, "Rejected bearer token");
                return AuthOutcome::Anonymous(AnonymousReason::InvalidToken(e));
            }
        };

        let Some(principal) = claims.principal() else {
            return AuthOutcome::Anonymous(AnonymousReason::InvalidToken(TokenError::Malformed));
        };

        match self.revocation.is_revoked(token).await {
            Ok(false) => {
                debug!(user_id = principal.id, "Authenticated request");
                AuthOutcome::Authenticated {
                    principal,
                    token: token.to_string(),
                }
            }
            Ok(true) => {
                debug!(user_id = principal.id, "Rejected revoked token");
                AuthOutcome::Anonymous(AnonymousReason::Revoked)
            }
            Err(e) => {
                error!(
                    user_id = principal.id,
                    error = %e,
                    "Revocation store unavailable; treating request as anonymous"
                );
                AuthOutcome::Anonymous(AnonymousReason::StoreUnavailable)
            }
        }
    }
}
