//! Keyed memoization with a fixed time-to-live.
//!
//! Entries are valid while `now - inserted_at < ttl`. Expired entries are
//! evicted lazily on lookup.

use dashmap::DashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::Result;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) < ttl
    }
}

pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now, self.ttl) {
                return Some(entry.value.clone());
            }
        }
        // Shard guard is released above; evict only if still stale
        self.entries
            .remove_if(key, |_, entry| !entry.is_fresh(now, self.ttl));
        None
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_at(key, value, Instant::now());
    }

    fn set_at(&self, key: impl Into<String>, value: V, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Cached value for `key`, or the result of `compute` (stored on success).
    ///
    /// Concurrent misses on the same key may each compute; the last writer wins.
    pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = compute().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Stored entries, including expired ones not yet evicted
    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = TtlCache::new(Duration::from_secs(600));
        cache.set("season", 7u32);
        assert_eq!(cache.get("season"), Some(7));
        assert_eq!(cache.get("career"), None);
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let cache = TtlCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.set_at("card:8478402", "card".to_string(), t0);

        let key = "card:8478402";
        assert!(cache.get_at(key, t0 + Duration::from_secs(599)).is_some());
        assert!(cache.get_at(key, t0 + Duration::from_secs(601)).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_at_exact_ttl_is_expired() {
        let cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set_at("k", 1u8, t0);
        assert!(cache.get_at("k", t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_set_restarts_ttl() {
        let cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set_at("k", 1u8, t0);
        cache.set_at("k", 2u8, t0 + Duration::from_secs(8));
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(15)), Some(2));
    }

    #[tokio::test]
    async fn test_get_or_try_insert_with_memoizes_success_only() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_try_insert_with("view", || async {
                Err(StatsError::UpstreamUnavailable("down".into()))
            })
            .await;
        assert!(err.is_err());
        assert_eq!(cache.len(), 0);

        let first = cache
            .get_or_try_insert_with("view", || async { Ok(1) })
            .await
            .unwrap();
        let second = cache
            .get_or_try_insert_with("view", || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!((first, second), (1, 1));
    }
}
