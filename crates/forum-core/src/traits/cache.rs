//! Shared TTL store capability trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for the shared, TTL-aware key/value store (Redis or in-memory).
///
/// Every key written through this trait carries a TTL; nothing is kept
/// forever. The provider is responsible for key prefixing and TTL
/// enforcement at millisecond granularity.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value only if the key does not already exist (NX).
    /// Returns `true` if the value was set, `false` if the key already existed.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// Delete a key (plain value or set).
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Set the TTL on an existing key. Returns `false` if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// Add a member to the set at `key`, creating it if needed.
    ///
    /// The set's TTL is raised to `ttl` when its remaining lifetime is
    /// shorter; it is never shortened.
    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> AppResult<()>;

    /// Return all members of the set at `key` (empty if absent).
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Write `key = value` with `ttl` and add `member` to `set_key` under the
    /// same rule as [`CacheProvider::set_add`].
    ///
    /// Providers that can do so perform both writes as one atomic operation.
    /// The default runs them in sequence, value first.
    async fn set_and_track(
        &self,
        key: &str,
        value: &str,
        set_key: &str,
        member: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        self.set(key, value, ttl).await?;
        self.set_add(set_key, member, ttl).await
    }

    /// List keys starting with `prefix`. Never used on a hot path.
    async fn keys_matching(&self, prefix: &str) -> AppResult<Vec<String>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
