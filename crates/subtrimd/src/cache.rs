//! Price suggestion cache.
//!
//! LRU-bounded map keyed by (lowercased name, country) with a fixed TTL.
//! Entries expire lazily at read time; a write unconditionally overwrites
//! with a fresh expiry. Two in-flight requests for the same key can both
//! miss and both call upstream; the later write wins. That race costs one
//! redundant upstream call and never corrupts an entry.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use subtrim_shared::PriceSuggestion;
use tokio::sync::Mutex;

struct CacheEntry {
    expires_at: Instant,
    value: PriceSuggestion,
}

pub struct PriceCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Cache key: lowercased trimmed name joined with the normalized country
    /// code by a fixed separator.
    pub fn key(subscription_name: &str, country_code: &str) -> String {
        format!("{}|{}", subscription_name.trim().to_lowercase(), country_code)
    }

    /// Read-time expiry: an entry whose deadline has passed is treated as
    /// absent and dropped.
    pub async fn get(&self, key: &str) -> Option<PriceSuggestion> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.value.clone());
            }
            entries.pop(key);
        }
        None
    }

    pub async fn put(&self, key: &str, value: PriceSuggestion) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key.to_string(),
            CacheEntry {
                expires_at: Instant::now() + self.ttl,
                value,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(name: &str) -> PriceSuggestion {
        PriceSuggestion::from_model(&json!({"monthly": 9.99, "confidence": 0.8}), name, "US")
    }

    #[test]
    fn key_normalizes_name() {
        assert_eq!(PriceCache::key("  Netflix ", "US"), "netflix|US");
    }

    #[tokio::test]
    async fn get_returns_fresh_entry() {
        let cache = PriceCache::new(4, Duration::from_secs(60));
        cache.put("netflix|US", sample("Netflix")).await;
        assert_eq!(cache.get("netflix|US").await, Some(sample("Netflix")));
    }

    #[tokio::test]
    async fn expired_entry_is_absent() {
        let cache = PriceCache::new(4, Duration::from_millis(10));
        cache.put("netflix|US", sample("Netflix")).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("netflix|US").await, None);
    }

    #[tokio::test]
    async fn put_overwrites_with_fresh_expiry() {
        let cache = PriceCache::new(4, Duration::from_secs(60));
        cache.put("k", sample("A")).await;
        cache.put("k", sample("B")).await;
        assert_eq!(cache.get("k").await.unwrap().subscription_name, "B");
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = PriceCache::new(2, Duration::from_secs(60));
        cache.put("a", sample("A")).await;
        cache.put("b", sample("B")).await;
        cache.put("c", sample("C")).await;
        // Least recently used key was evicted.
        assert_eq!(cache.get("a").await, None);
        assert!(cache.get("c").await.is_some());
    }
}
