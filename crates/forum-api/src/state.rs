//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use tracing::warn;

use forum_auth::identity::IdentityProviderClient;
use forum_auth::{
    AuthenticationGate, IdentityLinker, IssuedToken, PasswordHasher, RedirectPolicy,
    RevocationStore, TokenCodec,
};
use forum_cache::CacheManager;
use forum_core::config::AppConfig;
use forum_core::result::AppResult;
use forum_database::repositories::AccountRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Shared TTL store (Redis or in-memory)
    pub cache: CacheManager,
    /// Account repository
    pub accounts: Arc<dyn AccountRepository>,

    // ── Auth ─────────────────────────────────────────────────
    /// Session token encoder and verifier
    pub codec: Arc<TokenCodec>,
    /// Logout blacklist
    pub revocation: Arc<RevocationStore>,
    /// Per-request bearer authentication
    pub gate: AuthenticationGate,
    /// Provider login to account resolution
    pub linker: Arc<IdentityLinker>,
    /// Identity provider client (GitHub)
    pub identity_provider: Arc<dyn IdentityProviderClient>,
    /// Allow-listed front-end redirects
    pub redirects: Arc<RedirectPolicy>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
}

impl AppState {
    /// Wires the auth components on top of the given infrastructure.
    pub fn new(
        config: AppConfig,
        cache: CacheManager,
        accounts: Arc<dyn AccountRepository>,
        identity_provider: Arc<dyn IdentityProviderClient>,
    ) -> AppResult<Self> {
        let codec = Arc::new(TokenCodec::new(&config.auth)?);
        let revocation = Arc::new(RevocationStore::new(cache.clone(), &config.auth));
        let gate = AuthenticationGate::new(Arc::clone(&codec), Arc::clone(&revocation));
        let linker = Arc::new(IdentityLinker::new(Arc::clone(&accounts)));
        let redirects = Arc::new(RedirectPolicy::new(&config.oauth)?);

        Ok(Self {
            config: Arc::new(config),
            cache,
            accounts,
            codec,
            revocation,
            gate,
            linker,
            identity_provider,
            redirects,
            password_hasher: Arc::new(PasswordHasher::new()),
        })
    }

    /// Issues a session token and records it for "log out everywhere".
    ///
    /// A failure to record is logged; the token is still returned.
    pub async fn issue_session(&self, account_id: i64, display_name: &str) -> AppResult<IssuedToken> {
        let issued = self.codec.issue(account_id, display_name)?;
        if let Err(e) = self.revocation.track(&issued.token, account_id).await {
            warn!(account_id, error = %e, "Failed to track issued token");
        }
        Ok(issued)
    }
}
