//! In-memory shared store implementation using the moka crate.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use forum_core::config::cache::MemoryCacheConfig;
use forum_core::error::AppError;
use forum_core::result::AppResult;
use forum_core::traits::cache::CacheProvider;

/// A plain value together with the TTL it was written with.
#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL stored alongside it.
struct PerEntryTtl;

impl Expiry<String, StoredValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// A set value with its absolute expiry.
#[derive(Debug)]
struct TrackedSet {
    members: HashSet<String>,
    expires_at: Instant,
}

impl TrackedSet {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory shared store provider.
///
/// Only suitable for a single process: revocations are not visible to
/// other instances.
///
/// Entries leave only through their TTL or an explicit delete, never
/// through size-based eviction. Once `max_capacity` live values are held,
/// writes of new keys are refused with a cache error.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// Plain values with per-entry TTL.
    cache: Cache<String, StoredValue>,
    /// Upper bound on live plain values.
    max_entries: u64,
    /// Sets stored separately; expired sets are dropped lazily.
    sets: Arc<DashMap<String, TrackedSet>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory store from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder().expire_after(PerEntryTtl).build();

        Self {
            cache,
            max_entries: config.max_capacity,
            sets: Arc::new(DashMap::new()),
        }
    }

    /// Refuse a write of a new key when the store is full.
    ///
    /// `entry_count` lags behind recent writes, so pending maintenance
    /// (including expiry) is flushed before refusing.
    async fn ensure_room(&self, key: &str) -> AppResult<()> {
        if self.cache.contains_key(key) || self.cache.entry_count() < self.max_entries {
            return Ok(());
        }
        self.cache.run_pending_tasks().await;
        if self.cache.entry_count() < self.max_entries {
            return Ok(());
        }
        Err(AppError::cache(format!(
            "In-memory store is full ({} entries)",
            self.max_entries
        )))
    }

    /// Drop the set at `key` if it has expired. Returns whether a live set remains.
    fn prune_set(&self, key: &str, now: Instant) -> bool {
        self.sets.remove_if(key, |_, set| !set.is_live(now));
        self.sets.contains_key(key)
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|stored| stored.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.ensure_room(key).await?;
        self.cache
            .insert(
                key.to_string(),
                StoredValue {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        self.ensure_room(key).await?;
        let stored = StoredValue {
            value: value.to_string(),
            ttl,
        };
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async move { stored })
            .await;
        Ok(entry.is_fresh())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.sets.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        if self.cache.get(key).await.is_some() {
            return Ok(true);
        }
        Ok(self.prune_set(key, Instant::now()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        if let Some(stored) = self.cache.get(key).await {
            self.cache
                .insert(
                    key.to_string(),
                    StoredValue {
                        value: stored.value,
                        ttl,
                    },
                )
                .await;
            return Ok(true);
        }

        let now = Instant::now();
        if !self.prune_set(key, now) {
            return Ok(false);
        }
        Ok(match self.sets.get_mut(key) {
            Some(mut set) => {
                set.expires_at = now + ttl;
                true
            }
            None => false,
        })
    }

    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let deadline = now + ttl;
        let mut set = self
            .sets
            .entry(key.to_string())
            .or_insert_with(|| TrackedSet {
                members: HashSet::new(),
                expires_at: deadline,
            });

        if !set.is_live(now) {
            set.members.clear();
            set.expires_at = deadline;
        }
        set.members.insert(member.to_string());
        if set.expires_at < deadline {
            set.expires_at = deadline;
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        if !self.prune_set(key, Instant::now()) {
            return Ok(Vec::new());
        }
        Ok(self
            .sets
            .get(key)
            .map(|set| set.members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn keys_matching(&self, prefix: &str) -> AppResult<Vec<String>> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.to_string())
            .collect();

        keys.extend(
            self.sets
                .iter()
                .filter(|entry| entry.key().starts_with(prefix) && entry.value().is_live(now))
                .map(|entry| entry.key().clone()),
        );

        debug!(prefix, count = keys.len(), "Listed keys matching prefix");
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let provider = make_provider();
        provider
            .set("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        provider
            .set("long", "v", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(provider.get("short").await.unwrap(), None);
        assert!(!provider.exists("short").await.unwrap());
        assert_eq!(provider.get("long").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        let val = provider.get("key2").await.unwrap();
        assert_eq!(val, None);
    }

    #[tokio::test]
    async fn test_set_nx() {
        let provider = make_provider();
        let first = provider
            .set_nx("nx_key", "val", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(first);
        let second = provider
            .set_nx("nx_key", "val2", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!second);
        assert_eq!(provider.get("nx_key").await.unwrap().as_deref(), Some("val"));
    }

    #[tokio::test]
    async fn test_set_add_accumulates_members() {
        let provider = make_provider();
        provider
            .set_add("owner", "t1", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set_add("owner", "t2", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set_add("owner", "t1", Duration::from_secs(60))
            .await
            .unwrap();

        let mut members = provider.set_members("owner").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["t1".to_string(), "t2".to_string()]);
    }

    #[tokio::test]
    async fn test_set_ttl_is_never_shortened() {
        let provider = make_provider();
        provider
            .set_add("owner", "t1", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set_add("owner", "t2", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(provider.set_members("owner").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_expires() {
        let provider = make_provider();
        provider
            .set_add("owner", "t1", Duration::from_millis(30))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(provider.set_members("owner").await.unwrap().is_empty());
        assert!(!provider.exists("owner").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_and_track_writes_both() {
        let provider = make_provider();
        provider
            .set_and_track("revoked:h", "alice", "owner:alice", "tok", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            provider.get("revoked:h").await.unwrap().as_deref(),
            Some("alice")
        );
        assert_eq!(
            provider.set_members("owner:alice").await.unwrap(),
            vec!["tok".to_string()]
        );
    }

    #[tokio::test]
    async fn test_expire_on_value_and_set() {
        let provider = make_provider();
        provider
            .set("v", "1", Duration::from_secs(60))
            .await
            .unwrap();
        provider
            .set_add("s", "m", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(provider.expire("v", Duration::from_millis(20)).await.unwrap());
        assert!(provider.expire("s", Duration::from_millis(20)).await.unwrap());
        assert!(!provider.expire("missing", Duration::from_secs(1)).await.unwrap());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!provider.exists("v").await.unwrap());
        assert!(!provider.exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_matching() {
        let provider = make_provider();
        for key in ["auth:revoked:a", "auth:revoked:b", "auth:other:c"] {
            provider
                .set(key, "x", Duration::from_secs(60))
                .await
                .unwrap();
        }
        provider.cache.run_pending_tasks().await;

        let mut keys = provider.keys_matching("auth:revoked:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["auth:revoked:a", "auth:revoked:b"]);
    }

    #[tokio::test]
    async fn test_full_store_refuses_new_keys_without_evicting() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 3 });
        let ttl = Duration::from_secs(60);
        for key in ["a", "b", "c"] {
            provider.set(key, "v", ttl).await.unwrap();
        }
        provider.cache.run_pending_tasks().await;

        let err = provider.set("d", "v", ttl).await.unwrap_err();
        assert_eq!(err.kind, forum_core::error::ErrorKind::Cache);
        assert!(provider.set_nx("d", "v", ttl).await.is_err());

        provider.set("a", "updated", ttl).await.unwrap();
        for key in ["a", "b", "c"] {
            assert!(provider.exists(key).await.unwrap());
        }
        assert!(!provider.exists("d").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_free_room() {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1 });
        provider
            .set("short", "v", Duration::from_millis(50))
            .await
            .unwrap();
        provider.cache.run_pending_tasks().await;

        tokio::time::sleep(Duration::from_millis(100)).await;
        provider.set("next", "v", Duration::from_secs(60)).await.unwrap();
        assert!(provider.exists("next").await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
