//! Capacity-bounded LRU cache with hit/miss statistics.
//!
//! Used for resampling index maps, colour arrays and built palettes. Keys
//! must include every parameter that changes the cached output.

use lru::LruCache;
use serde::Serialize;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Statistics for a bounded cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU cache that evicts the least recently used entry once full.
pub struct BoundedCache<K: Hash + Eq, V> {
    cache: LruCache<K, V>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up an entry, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.cache.contains(key) {
            self.hits += 1;
            self.cache.get(key)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Check if a key exists in the cache without updating LRU order.
    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    /// Insert an entry, evicting the oldest one if the cache is full.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some((evicted_key, _)) = self.cache.push(key, value) {
            // push() also returns the old value when the key was already present
            if !self.cache.contains(&evicted_key) {
                self.evictions += 1;
            }
        }
    }

    /// Return the cached value for `key`, computing and inserting it on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if self.cache.contains(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            if self.cache.len() == self.cache.cap().get() {
                self.evictions += 1;
            }
        }
        self.cache.get_or_insert(key, compute)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
