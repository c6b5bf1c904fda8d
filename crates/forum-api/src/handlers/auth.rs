//! Auth handlers: current user, logout, logout everywhere, blacklist status, login.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use forum_core::error::AppError;
use forum_entity::account::AuthProvider;

use crate::dto::request::LoginRequest;
use crate::dto::response::{
    AccountResponse, BlacklistStatusResponse, CurrentUserResponse, LoginResponse,
    LogoutAllResponse, LogoutResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, MaybeUser};
use crate::state::AppState;

/// Message for any failed local login, whatever the cause.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// GET /api/auth/user
pub async fn current_user(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let Some(user) = user else {
        return Ok(Json(CurrentUserResponse::anonymous()));
    };

    let Some(account) = state.accounts.find_by_id(user.principal.id).await? else {
        warn!(account_id = user.principal.id, "Token refers to a missing account");
        return Ok(Json(CurrentUserResponse::anonymous()));
    };

    let issued = state.issue_session(account.id, &account.username).await?;

    Ok(Json(CurrentUserResponse {
        authenticated: true,
        user: Some(AccountResponse::from(account)),
        token: Some(issued.token),
    }))
}

/// POST /api/auth/logout
///
/// Always answers 200; a revocation that fails is logged and the token
/// stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Json<LogoutResponse> {
    let timestamp = Utc::now().timestamp_millis();

    let Some(user) = user else {
        return Json(LogoutResponse {
            message: "No active session".to_string(),
            timestamp,
            user: None,
        });
    };

    let owner = user.principal.id;
    if let Err(e) = state.revocation.revoke(&user.token, owner).await {
        warn!(owner, error = %e, "Logout could not revoke token");
    }

    Json(LogoutResponse {
        message: "Logout successful".to_string(),
        timestamp,
        user: Some(user.principal.display_name),
    })
}

/// POST /api/auth/logout/all
pub async fn logout_all(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<LogoutAllResponse>, ApiError> {
    let user = user.ok_or_else(|| AppError::validation("User not authenticated"))?;
    let owner = user.principal.id;

    state.revocation.revoke(&user.token, owner).await?;
    let revoked = state.revocation.revoke_all_for_owner(owner).await?;

    info!(owner, revoked, "Logged out of all sessions");

    Ok(Json(LogoutAllResponse {
        message: "Logged out from all devices".to_string(),
        user: user.principal.display_name,
        revoked,
        timestamp: Utc::now().timestamp_millis(),
    }))
}

/// GET /api/auth/blacklist/status
pub async fn blacklist_status(
    State(state): State<AppState>,
) -> Result<Json<BlacklistStatusResponse>, ApiError> {
    let blacklist_size = state.revocation.size().await?;
    Ok(Json(BlacklistStatusResponse {
        blacklist_size,
        timestamp: Utc::now().timestamp_millis(),
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid login request: {e}")))?;

    let account = state
        .accounts
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

    let hash = match (account.provider, account.password_hash.as_deref()) {
        (AuthProvider::Local, Some(hash)) => hash,
        _ => return Err(AppError::authentication(INVALID_CREDENTIALS).into()),
    };

    if !state.password_hasher.verify_password(&req.password, hash)? {
        info!(account_id = account.id, "Local login rejected");
        return Err(AppError::authentication(INVALID_CREDENTIALS).into());
    }

    let issued = state.issue_session(account.id, &account.username).await?;
    info!(account_id = account.id, "Local login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.claims.expires_at().unwrap_or_else(Utc::now),
        user: forum_auth::Principal {
            id: account.id,
            display_name: account.username,
        },
    }))
}
