use crate::sources::AggregateCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

struct CacheEntry {
    stored_at: Instant,
    value: serde_json::Value,
}

/// Process-wide aggregate cache with a single invalidation granularity.
///
/// Entries expire after `ttl`. `invalidate_all` drops everything and bumps
/// the generation; `put` under a stale generation is refused.
pub struct MemoryAggregateCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
}

impl MemoryAggregateCache {
    /// Creates a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl AggregateCache for MemoryAggregateCache {
    async fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            debug!(key, "Cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    async fn put(&self, key: &str, value: serde_json::Value, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key, generation, "Discarding value computed before invalidation");
            return false;
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
        true
    }

    async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        entries.clear();
        info!(count, generation, "Aggregate cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = MemoryAggregateCache::new(Duration::from_secs(60));
        let generation = cache.generation().await;
        assert!(cache.put("k", json!(1), generation).await);
        assert_eq!(cache.get("k").await, Some(json!(1)));
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_and_bumps_generation() {
        let cache = MemoryAggregateCache::new(Duration::from_secs(60));
        let before = cache.generation().await;
        cache.put("a", json!("x"), before).await;
        cache.put("b", json!("y"), before).await;

        cache.invalidate_all().await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.generation().await, before + 1);
        assert!(cache.get("a").await.is_none());
    }

    #[tokio::test]
    async fn test_stale_generation_is_refused() {
        let cache = MemoryAggregateCache::new(Duration::from_secs(60));
        let started = cache.generation().await;
        cache.invalidate_all().await;

        assert!(!cache.put("k", json!(1), started).await);
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = MemoryAggregateCache::new(Duration::ZERO);
        let generation = cache.generation().await;
        cache.put("k", json!(1), generation).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("k").await.is_none());
    }
}
