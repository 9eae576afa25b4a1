//! In-memory page cache
//!
//! Holds rendered listing pages for a short TTL. Deleting a post clears the
//! whole cache so a removed post never lingers on the index.
//!
//! Readers take a [`PageCache::generation`] before querying the database and
//! hand it back to [`PageCache::insert`]; a page computed before the latest
//! `clear()` is returned to the caller but not stored.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

/// TTL cache shared between handlers
pub struct PageCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
    /// Bumped by `clear()` while the write lock is held
    generation: AtomicU64,
}

impl<K, V> PageCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current generation; pass it to `insert` with the value computed after.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// A zero TTL turns caching off.
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Fresh entry for `key`, if any.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Store `value` unless the cache was cleared since `seen` was taken.
    pub async fn insert(&self, key: K, value: V, seen: u64) -> Arc<V> {
        let value = Arc::new(value);
        if !self.is_enabled() {
            return value;
        }

        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::Acquire) != seen {
            tracing::debug!("Skipping page computed before the last clear");
            return value;
        }
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                stored_at: Instant::now(),
            },
        );
        value
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(dropped, "Page cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.insert(1u32, "page one", 0).await;
        assert_eq!(cache.get(&1).await.as_deref(), Some(&"page one"));

        tokio::time::advance(Duration::from_secs(19)).await;
        assert!(cache.get(&1).await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&1).await.is_none());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = PageCache::new(Duration::from_secs(60));
        cache.insert(1u32, "a", 0).await;
        cache.insert(2u32, "b", 0).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
        assert!(cache.get(&1).await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_disables_caching() {
        let cache = PageCache::new(Duration::ZERO);
        assert!(!cache.is_enabled());
        let value = cache.insert(1u32, "a", 0).await;
        assert_eq!(*value, "a");
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn insert_evicts_stale_entries() {
        let cache = PageCache::new(Duration::from_secs(5));
        cache.insert(1u32, "old", 0).await;
        tokio::time::advance(Duration::from_secs(6)).await;
        cache.insert(2u32, "new", 0).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn page_computed_before_clear_is_not_stored() {
        let cache = PageCache::new(Duration::from_secs(60));
        let seen = cache.generation();

        // A delete lands while the page is being built
        cache.clear().await;

        let value = cache.insert(1u32, "deleted post", seen).await;
        assert_eq!(*value, "deleted post");
        assert!(cache.get(&1).await.is_none());

        let fresh = cache.generation();
        assert_ne!(fresh, seen);
        cache.insert(1u32, "current", fresh).await;
        assert_eq!(cache.get(&1).await.as_deref(), Some(&"current"));
    }
}
