//! Session-scoped fetch caches.
//!
//! Each source adapter owns one `FetchCache` per remote keyspace (bucket
//! index, game detail, cover URL, image existence). Entries live for the
//! process lifetime and are only dropped by an explicit `clear`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;

use tokio::sync::RwLock;

/// In-memory map of fetched payloads keyed by remote id.
///
/// A stored `None` is a negative entry ("not found" / 404) and counts as a
/// hit like any other value. Writes are first-writer-wins: once a key is
/// populated, later fetches for the same key cannot overwrite it within the
/// session. Concurrent misses for the same key may both hit the network;
/// there is no request coalescing beyond the cache hit after the first
/// completion.
#[derive(Debug)]
pub struct FetchCache<K, V> {
    entries: RwLock<HashMap<K, Option<V>>>,
}

impl<K, V> Default for FetchCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FetchCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a key. Outer `None` means "never fetched"; `Some(None)` is a
    /// cached negative result.
    pub async fn get(&self, key: &K) -> Option<Option<V>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Insert unless the key is already populated, returning the value that
    /// ended up in the cache.
    pub async fn insert_if_absent(&self, key: K, value: Option<V>) -> Option<V> {
        let mut entries = self.entries.write().await;
        entries.entry(key).or_insert(value).clone()
    }

    /// Return the cached value for `key`, running `fetch` on a miss.
    ///
    /// A successful fetch is stored first-writer-wins; the caller always
    /// observes the winning value. Fetch errors propagate unchanged and
    /// cache nothing, so the next call retries.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: K, fetch: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok(cached);
        }

        let fetched = fetch().await?;
        Ok(self.insert_if_absent(key, fetched).await)
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry. The only invalidation this cache supports.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache: FetchCache<String, u32> = FetchCache::new();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(Some(7))
        };

        let v = cache.get_or_fetch("k".to_string(), fetch).await.unwrap();
        assert_eq!(v, Some(7));

        let v = cache
            .get_or_fetch("k".to_string(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(Some(99))
            })
            .await
            .unwrap();
        assert_eq!(v, Some(7), "second fetch must not run");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_negative_entry_is_a_hit() {
        let cache: FetchCache<u64, String> = FetchCache::new();

        let v = cache
            .get_or_fetch(404, || async { Ok::<_, ()>(None) })
            .await
            .unwrap();
        assert_eq!(v, None);
        assert!(cache.contains(&404).await);

        // The negative entry shields the key from refetching.
        let v = cache
            .get_or_fetch(404, || async { Ok::<_, ()>(Some("late".to_string())) })
            .await
            .unwrap();
        assert_eq!(v, None);
    }

    #[tokio::test]
    async fn test_first_writer_wins() {
        let cache: FetchCache<u64, u32> = FetchCache::new();

        assert_eq!(cache.insert_if_absent(1, Some(10)).await, Some(10));
        assert_eq!(cache.insert_if_absent(1, Some(20)).await, Some(10));
        assert_eq!(cache.get(&1).await, Some(Some(10)));
    }

    #[tokio::test]
    async fn test_error_caches_nothing() {
        let cache: FetchCache<u64, u32> = FetchCache::new();

        let result = cache
            .get_or_fetch(5, || async { Err::<Option<u32>, _>("boom") })
            .await;
        assert!(result.is_err());
        assert!(!cache.contains(&5).await);

        // A later successful fetch populates the key normally.
        let v = cache
            .get_or_fetch(5, || async { Ok::<_, &str>(Some(3)) })
            .await
            .unwrap();
        assert_eq!(v, Some(3));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache: FetchCache<u64, u32> = FetchCache::new();
        cache.insert_if_absent(1, Some(1)).await;
        cache.insert_if_absent(2, None).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.get(&1).await, None);
    }
}
