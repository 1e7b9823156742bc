//! Cost-bounded memo keyed by database id.
//!
//! Backed by `moka::sync::Cache` with least-recently-used eviction. Every
//! entry costs one unit, so the capacity is an entry count. Values are
//! shared as `Arc`s; a hit returns the identical object that was inserted.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit/miss counters of a [`BoundedMemo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
}

/// LRU memo from id to an immutable shared value.
pub struct BoundedMemo<V> {
    cache: Cache<i64, Arc<V>>,
    capacity: u64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Send + Sync + 'static> BoundedMemo<V> {
    /// Create a memo holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            cache,
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `id`, computing and inserting it on a miss.
    pub fn get_or_insert_with(&self, id: i64, init: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.cache.get(&id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(init());
        self.cache.insert(id, Arc::clone(&value));
        // Apply eviction now so the capacity bound holds between calls
        self.cache.run_pending_tasks();
        value
    }

    /// Returns true if `id` is cached.
    pub fn contains(&self, id: i64) -> bool {
        self.cache.contains_key(&id)
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
        }
    }
}
