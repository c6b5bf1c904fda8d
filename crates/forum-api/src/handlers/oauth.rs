//! Identity provider login: authorize redirect and callback.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use tracing::{info, warn};
use uuid::Uuid;

use forum_auth::LinkError;
use forum_cache::keys;
use forum_core::error::AppError;
use forum_core::traits::CacheProvider;
use forum_entity::account::AuthProvider;

use crate::dto::request::OAuthCallbackQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// Shown for provider or store faults the user cannot act on.
const LOGIN_FAILED: &str = "Login failed, please try again";

/// Resolves the path segment to the configured provider client.
fn supported_provider(state: &AppState, name: &str) -> Result<AuthProvider, String> {
    let unsupported = || LinkError::UnsupportedProvider(name.to_string()).to_string();
    let provider: AuthProvider = name.parse().map_err(|_| unsupported())?;
    if provider != state.identity_provider.provider() {
        return Err(unsupported());
    }
    Ok(provider)
}

/// GET /api/auth/oauth2/authorize/{provider}
pub async fn authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Redirect, ApiError> {
    let provider =
        supported_provider(&state, &provider).map_err(AppError::validation)?;

    let nonce = Uuid::new_v4().simple().to_string();
    let ttl = Duration::from_secs(state.config.oauth.state_ttl_seconds);
    let stored = state
        .cache
        .set_nx(&keys::oauth_state(&nonce), provider.as_str(), ttl)
        .await?;
    if !stored {
        return Err(AppError::conflict("OAuth state collision, please retry").into());
    }

    let url = state.identity_provider.authorize_url(&nonce)?;
    Ok(Redirect::to(&url))
}

/// GET /api/auth/oauth2/callback/{provider}
///
/// Every outcome is a redirect to the front-end, carrying `token` on
/// success or a user-facing `error` otherwise.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    let target = match complete_login(&state, &provider, query).await {
        Ok(token) => state.redirects.with_token(&token),
        Err(message) => state.redirects.with_error(&message),
    };
    Redirect::to(&target)
}

async fn complete_login(
    state: &AppState,
    provider: &str,
    query: OAuthCallbackQuery,
) -> Result<String, String> {
    if let Some(error) = query.error {
        info!(provider, error = %error, "Provider denied login");
        return Err(query.error_description.unwrap_or(error));
    }

    let provider = supported_provider(state, provider)?;

    let nonce = query
        .state
        .ok_or_else(|| "Missing OAuth state".to_string())?;
    if !consume_state(state, &nonce, provider).await {
        return Err("Invalid or expired OAuth state".to_string());
    }

    let code = query
        .code
        .ok_or_else(|| "Missing authorization code".to_string())?;

    let profile = state
        .identity_provider
        .fetch_profile(&code)
        .await
        .map_err(|e| {
            warn!(provider = %provider, error = %e, "Fetching provider profile failed");
            LOGIN_FAILED.to_string()
        })?;

    let account = state.linker.link(&profile).await.map_err(|e| match e {
        LinkError::Store(err) => {
            warn!(provider = %provider, error = %err, "Account store failed during login");
            LOGIN_FAILED.to_string()
        }
        other => other.to_string(),
    })?;

    let issued = state
        .issue_session(account.id, &account.username)
        .await
        .map_err(|e| {
            warn!(account_id = account.id, error = %e, "Issuing token failed");
            LOGIN_FAILED.to_string()
        })?;

    info!(account_id = account.id, provider = %provider, "Provider login succeeded");
    Ok(issued.token)
}

/// Deletes the stored state, reporting whether it was present for `provider`.
async fn consume_state(state: &AppState, nonce: &str, provider: AuthProvider) -> bool {
    let key = keys::oauth_state(nonce);
    let stored = match state.cache.get(&key).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "OAuth state lookup failed");
            return false;
        }
    };
    if let Err(e) = state.cache.delete(&key).await {
        warn!(error = %e, "OAuth state cleanup failed");
    }
    stored.as_deref() == Some(provider.as_str())
}
