//! Token blacklist backed by the shared TTL store.
//!
//! A revoked token is recorded under the SHA-256 of its compact form and
//! the entry expires together with the token, plus a small skew margin.
//! Each account also has a set of raw tokens, keyed by account id, so
//! that every session of a user can be revoked at once.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use forum_cache::CacheManager;
use forum_cache::keys;
use forum_core::config::AuthConfig;
use forum_core::error::{AppError, ErrorKind};
use forum_core::result::AppResult;
use forum_core::traits::cache::CacheProvider;

use crate::token::TokenCodec;

/// Records and answers "was this token logged out?".
#[derive(Debug, Clone)]
pub struct RevocationStore {
    /// Shared TTL store.
    cache: CacheManager,
    /// Extra lifetime added to every entry to absorb clock skew between nodes.
    skew: Duration,
    /// Upper bound on a single store call.
    timeout: Duration,
}

impl RevocationStore {
    /// Creates a revocation store from auth configuration.
    pub fn new(cache: CacheManager, config: &AuthConfig) -> Self {
        Self::with_settings(cache, config.revocation_skew(), config.store_timeout())
    }

    /// Creates a revocation store with explicit skew margin and store timeout.
    pub fn with_settings(cache: CacheManager, skew: Duration, timeout: Duration) -> Self {
        Self {
            cache,
            skew,
            timeout,
        }
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AppError::new(
                ErrorKind::Cache,
                format!(
                    "Shared store {operation} timed out after {}ms",
                    self.timeout.as_millis()
                ),
            )),
        }
    }

    /// TTL for an entry tied to `token`, or `None` once the token has expired.
    fn entry_ttl(&self, token: &str) -> AppResult<Option<Duration>> {
        let expires_at = TokenCodec::expiry_of(token)
            .map_err(|_| AppError::validation("Cannot track a malformed token"))?;
        Ok(remaining_ttl(expires_at, Utc::now(), self.skew))
    }

    /// Blacklists `token` for the rest of its lifetime and records it
    /// under the account `owner`.
    ///
    /// Returns `false` when the token had already expired and nothing was
    /// written. Revoking the same token again is harmless.
    pub async fn revoke(&self, token: &str, owner: i64) -> AppResult<bool> {
        let Some(ttl) = self.entry_ttl(token)? else {
            debug!(owner, "Token already expired; nothing to revoke");
            return Ok(false);
        };

        let entry_key = keys::revoked_token(&token_hash(token));
        let owner_key = keys::owner_tokens(owner);
        self.bounded(
            "revoke",
            self.cache
                .set_and_track(&entry_key, &owner.to_string(), &owner_key, token, ttl),
        )
        .await?;

        info!(owner, ttl_ms = ttl.as_millis() as u64, "Token revoked");
        Ok(true)
    }

    /// Whether `token` has been revoked. Absence means not revoked.
    pub async fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let entry_key = keys::revoked_token(&token_hash(token));
        self.bounded("lookup", self.cache.exists(&entry_key)).await
    }

    /// Adds a freshly issued token to its owner's set without revoking it.
    pub async fn track(&self, token: &str, owner: i64) -> AppResult<()> {
        let Some(ttl) = self.entry_ttl(token)? else {
            return Ok(());
        };
        self.bounded(
            "track",
            self.cache.set_add(&keys::owner_tokens(owner), token, ttl),
        )
        .await
    }

    /// Revokes every token currently recorded for `owner`, then forgets the set.
    ///
    /// Not atomic as a whole: a token issued while this runs may survive.
    /// Returns how many recorded tokens were processed.
    pub async fn revoke_all_for_owner(&self, owner: i64) -> AppResult<usize> {
        let owner_key = keys::owner_tokens(owner);
        let tokens = self
            .bounded("list owner tokens", self.cache.set_members(&owner_key))
            .await?;

        let mut processed = 0;
        for token in &tokens {
            match self.revoke(token, owner).await {
                Ok(_) => processed += 1,
                Err(e) if e.kind == ErrorKind::Validation => {
                    warn!(owner, "Skipping malformed token in owner set");
                }
                Err(e) => return Err(e),
            }
        }

        self.bounded("clear owner tokens", self.cache.delete(&owner_key))
            .await?;

        info!(owner, processed, "Revoked all tokens for owner");
        Ok(processed)
    }

    /// Approximate number of live revocation entries. Diagnostics only.
    pub async fn size(&self) -> AppResult<usize> {
        let keys = self
            .bounded(
                "count",
                self.cache.keys_matching(&keys::revoked_prefix()),
            )
            .await?;
        Ok(keys.len())
    }
}

/// Hex SHA-256 of a compact token, used as its revocation key.
pub fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Shortest entry lifetime written; a token is still accepted at its
/// exact expiry instant.
const MIN_ENTRY_TTL: Duration = Duration::from_millis(1);

/// Lifetime left for a token expiring at `expires_at`, plus `skew`,
/// never below [`MIN_ENTRY_TTL`].
///
/// `None` once `now` is past the expiry instant.
pub fn remaining_ttl(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    skew: Duration,
) -> Option<Duration> {
    if now > expires_at {
        return None;
    }
    let left = (expires_at - now).to_std().ok()?;
    Some((left + skew).max(MIN_ENTRY_TTL))
}
