//! `AuthUser` extractor: reads the principal the auth middleware established.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use forum_auth::Principal;
use forum_core::error::AppError;

use crate::context::RequestContext;
use crate::error::ApiError;

/// Authenticated caller, available in handlers that require login.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Who the caller is.
    pub principal: Principal,
    /// The bearer token presented on this request.
    pub token: String,
}

impl AuthUser {
    fn from_context(ctx: Option<&RequestContext>) -> Option<Self> {
        let ctx = ctx?;
        Some(Self {
            principal: ctx.principal.clone()?,
            token: ctx.token.clone()?,
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_context(parts.extensions.get::<RequestContext>())
            .ok_or_else(|| ApiError(AppError::authentication("Authentication required")))
    }
}

/// Optional caller for endpoints that serve anonymous requests too.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(AuthUser::from_context(
            parts.extensions.get::<RequestContext>(),
        )))
    }
}
