//! Simplified runways for airport overview drawing.

use std::sync::Arc;

use super::memo::{BoundedMemo, MemoStats};
use crate::model::Runway;

/// Per-airport runway lists, fetched once and kept in an LRU.
pub struct RunwayOverviewCache {
    memo: BoundedMemo<Vec<Runway>>,
}

impl RunwayOverviewCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            memo: BoundedMemo::new(capacity),
        }
    }

    /// Runways of `airport_id`, calling `fetch` on a miss.
    pub fn get_or_fetch(
        &self,
        airport_id: i64,
        fetch: impl FnOnce() -> Vec<Runway>,
    ) -> Arc<Vec<Runway>> {
        self.memo.get_or_insert_with(airport_id, fetch)
    }

    pub fn contains(&self, airport_id: i64) -> bool {
        self.memo.contains(airport_id)
    }

    pub fn clear(&self) {
        self.memo.clear();
    }

    pub fn stats(&self) -> MemoStats {
        self.memo.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetches_once_per_airport() {
        let cache = RunwayOverviewCache::new(4);
        let mut fetches = 0;
        let runway = Runway {
            airport_id: 1,
            length: 9000,
            ..Default::default()
        };

        let first = cache.get_or_fetch(1, || {
            fetches += 1;
            vec![runway.clone()]
        });
        let second = cache.get_or_fetch(1, || {
            fetches += 1;
            Vec::new()
        });

        assert_eq!(fetches, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_empty_list_is_cached() {
        let cache = RunwayOverviewCache::new(4);
        cache.get_or_fetch(5, Vec::new);
        assert!(cache.contains(5));
        cache.clear();
        assert!(!cache.contains(5));
    }
}
