use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use super::clock::Clock;
use crate::types::Timeframe;

/// A thread-safe cache with TTL support and a size bound.
///
/// Expiry is checked against the injected [`Clock`]. When an insert would
/// exceed `max_entries`, expired entries are dropped first, then the entries
/// closest to expiry.
pub struct Cache<V> {
    data: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V: Clone> Cache<V> {
    /// Create a new cache. `max_entries` of 0 means unbounded.
    pub fn new(default_ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            data: DashMap::new(),
            default_ttl,
            max_entries,
            clock,
        }
    }

    /// Get a value from the cache.
    ///
    /// An expired entry is removed only if it is still expired under the
    /// shard lock, so a concurrent `set` of the same key is never lost.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        if let Some(entry) = self.data.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        self.data.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// Set a value in the cache with the default TTL.
    pub fn set(&self, key: String, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Set a value in the cache with a custom TTL.
    pub fn set_with_ttl(&self, key: String, value: V, ttl: Duration) {
        if self.max_entries > 0 && !self.data.contains_key(&key) {
            self.make_room();
        }
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: self.clock.now() + ttl,
            },
        );
    }

    /// Remove all expired entries from the cache.
    pub fn cleanup(&self) {
        let now = self.clock.now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    /// Get the number of entries in the cache (including expired).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn make_room(&self) {
        if self.data.len() < self.max_entries {
            return;
        }
        self.cleanup();

        let excess = (self.data.len() + 1).saturating_sub(self.max_entries);
        if excess == 0 {
            return;
        }
        let mut by_expiry: Vec<(DateTime<Utc>, String)> = self
            .data
            .iter()
            .map(|entry| (entry.expires_at, entry.key().clone()))
            .collect();
        by_expiry.sort();
        for (_, key) in by_expiry.into_iter().take(excess) {
            self.data.remove(&key);
        }
    }
}

/// Cache key for one provider, symbol, timeframe and lookback.
pub fn series_key(provider: &str, symbol: &str, timeframe: Timeframe, lookback: usize) -> String {
    format!(
        "{}:{}:{}:{}",
        provider,
        symbol.trim().to_uppercase(),
        timeframe,
        lookback
    )
}

/// Cache key for a provider quote.
pub fn quote_key(provider: &str, symbol: &str) -> String {
    format!("{}:{}:quote", provider, symbol.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::ManualClock;

    fn cache_with_clock(ttl_secs: i64, max_entries: usize) -> (Cache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = Cache::new(Duration::seconds(ttl_secs), max_entries, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_basic() {
        let (cache, _) = cache_with_clock(60, 0);
        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiration() {
        let (cache, clock) = cache_with_clock(60, 0);
        cache.set("key1".to_string(), "value1".to_string());
        clock.advance(Duration::seconds(59));
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get("key1"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_custom_ttl() {
        let (cache, clock) = cache_with_clock(60, 0);
        cache.set_with_ttl("short".to_string(), "value".to_string(), Duration::seconds(1));
        cache.set("long".to_string(), "value".to_string());

        clock.advance(Duration::seconds(2));

        assert_eq!(cache.get("short"), None);
        assert_eq!(cache.get("long"), Some("value".to_string()));
    }

    #[test]
    fn test_expired_get_keeps_fresh_replacement() {
        let (cache, clock) = cache_with_clock(10, 0);
        cache.set("key".to_string(), "stale".to_string());
        clock.advance(Duration::seconds(20));

        // replaced after expiry but before any read
        cache.set("key".to_string(), "fresh".to_string());
        assert_eq!(cache.get("key"), Some("fresh".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_get_removes_only_expired_entry() {
        let (cache, clock) = cache_with_clock(10, 0);
        cache.set("key".to_string(), "stale".to_string());
        clock.advance(Duration::seconds(10));

        assert_eq!(cache.get("key"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_concurrent_set_and_expired_get() {
        let (cache, clock) = cache_with_clock(10, 0);
        let cache = Arc::new(cache);
        cache.set("key".to_string(), "stale".to_string());
        clock.advance(Duration::seconds(20));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        cache.set("key".to_string(), "fresh".to_string());
                    } else {
                        let _ = cache.get("key");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // every writer stored a fresh entry; no reader may have dropped it
        assert_eq!(cache.get("key"), Some("fresh".to_string()));
    }

    #[test]
    fn test_cache_cleanup() {
        let (cache, clock) = cache_with_clock(10, 0);
        cache.set("key1".to_string(), "value1".to_string());
        cache.set_with_ttl("key2".to_string(), "value2".to_string(), Duration::seconds(60));

        clock.advance(Duration::seconds(20));
        cache.cleanup();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key2"), Some("value2".to_string()));
    }

    #[test]
    fn test_capacity_evicts_soonest_expiring() {
        let (cache, clock) = cache_with_clock(60, 2);
        cache.set("a".to_string(), "1".to_string());
        clock.advance(Duration::seconds(1));
        cache.set("b".to_string(), "2".to_string());
        clock.advance(Duration::seconds(1));
        cache.set("c".to_string(), "3".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("2".to_string()));
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }

    #[test]
    fn test_capacity_prefers_dropping_expired() {
        let (cache, clock) = cache_with_clock(60, 2);
        cache.set("long".to_string(), "1".to_string());
        cache.set_with_ttl("short".to_string(), "2".to_string(), Duration::seconds(1));
        clock.advance(Duration::seconds(5));
        cache.set("new".to_string(), "3".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("long"), Some("1".to_string()));
        assert_eq!(cache.get("new"), Some("3".to_string()));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _) = cache_with_clock(60, 1);
        cache.set("key".to_string(), "value1".to_string());
        cache.set("key".to_string(), "value2".to_string());

        assert_eq!(cache.get("key"), Some("value2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_normalize_symbol() {
        assert_eq!(
            series_key("yahoo", " petr4.sa", Timeframe::OneDay, 200),
            "yahoo:PETR4.SA:1d:200"
        );
        assert_eq!(quote_key("hg_brasil", "vale3"), "hg_brasil:VALE3:quote");
    }
}
