//! Bounded, content-addressed result cache

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

use crate::error::Result;

/// SHA-256 hex digest of the sorted-key JSON form of `value`.
///
/// Going through `serde_json::Value` orders object keys, so two equal
/// inputs always hash the same regardless of field declaration order.
pub fn key_for<T: Serialize>(value: &T) -> Result<String> {
    let canonical = serde_json::to_string(&serde_json::to_value(value)?)?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}

/// LRU cache keyed by content hash, safe to share behind an `Arc`.
pub struct ResultCache<V: Clone> {
    entries: Mutex<LruCache<String, V>>,
    capacity: NonZeroUsize,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    /// Look up a key, marking it most recently used.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Insert a value, evicting the least recently used entry when full.
    pub async fn put(&self, key: String, value: V) {
        self.entries.lock().await.put(key, value);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Forward {
        a: u32,
        b: &'static str,
    }

    #[derive(Serialize)]
    struct Reversed {
        b: &'static str,
        a: u32,
    }

    #[test]
    fn test_key_is_field_order_independent() {
        let k1 = key_for(&Forward { a: 1, b: "x" }).unwrap();
        let k2 = key_for(&Reversed { b: "x", a: 1 }).unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
    }

    #[test]
    fn test_key_changes_with_content() {
        let k1 = key_for(&Forward { a: 1, b: "x" }).unwrap();
        let k2 = key_for(&Forward { a: 2, b: "x" }).unwrap();
        assert_ne!(k1, k2);
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = ResultCache::new(4);
        assert!(cache.get("missing").await.is_none());

        cache.put("k".to_string(), 42).await;
        assert_eq!(cache.get("k").await, Some(42));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = ResultCache::new(2);
        cache.put("a".to_string(), 1).await;
        cache.put("b".to_string(), 2).await;

        // touch "a" so "b" is the eviction candidate
        assert_eq!(cache.get("a").await, Some(1));
        cache.put("c".to_string(), 3).await;

        assert_eq!(cache.get("a").await, Some(1));
        assert!(cache.get("b").await.is_none());
        assert_eq!(cache.get("c").await, Some(3));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one() {
        let cache = ResultCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put("a".to_string(), 1).await;
        cache.put("b".to_string(), 2).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResultCache::new(2);
        cache.put("a".to_string(), 1).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
