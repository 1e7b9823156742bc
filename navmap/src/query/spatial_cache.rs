//! Last-fetched entity list of one kind.
//!
//! A [`SpatialCache`] remembers the inflated rectangle its list covers and
//! the [`QueryKey`] it was fetched with. [`SpatialCache::update`] decides
//! whether a request can be answered from the list; if not, the list is
//! cleared and the caller fetches and [`fill`](SpatialCache::fill)s it.
//!
//! # Lifecycle
//!
//! ```text
//! update(rect, key, lazy=false) ── covered & compatible ──► reuse
//!            │
//!            └── otherwise ──► clear ──► caller queries ──► fill(rows)
//! ```

use std::collections::HashSet;

use crate::geo::{Rect, ViewportNormalizer};
use crate::model::{MapObject, QueryKey};

/// Where fetched rows go relative to query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrder {
    /// Keep query order.
    #[default]
    Append,
    /// Reverse query order, so the first row ends up drawn last.
    Prepend,
}

/// Entities of one kind for the current viewport.
#[derive(Debug)]
pub struct SpatialCache<T> {
    entries: Vec<T>,
    covered: Option<Rect>,
    key: Option<QueryKey>,
    valid: bool,
    rebuilds: u64,
}

impl<T> Default for SpatialCache<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            covered: None,
            key: None,
            valid: false,
            rebuilds: 0,
        }
    }
}

impl<T: MapObject> SpatialCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `requested` needs a new fetch.
    ///
    /// Lazy updates never fetch. Otherwise the list is reused when it is
    /// valid, its covered rectangle contains `requested` and its key is
    /// compatible with `key`. On a miss the list is cleared, the inflated
    /// request becomes the covered rectangle and `true` is returned.
    pub fn update(
        &mut self,
        requested: &Rect,
        key: QueryKey,
        lazy: bool,
        normalizer: &ViewportNormalizer,
    ) -> bool {
        if lazy {
            return false;
        }

        let reusable = self.valid
            && self.covered.is_some_and(|c| c.contains(requested))
            && self.key.is_some_and(|k| k.is_compatible(&key));
        if reusable {
            return false;
        }

        self.entries.clear();
        self.valid = false;
        self.covered = Some(normalizer.inflate(requested));
        self.key = Some(key);
        true
    }

    /// Replace the list with freshly fetched entities.
    ///
    /// Duplicates by id are dropped, keeping the first occurrence. An empty
    /// input is a valid result and is not refetched until the viewport or
    /// key changes.
    pub fn fill(&mut self, fetched: Vec<T>, order: FetchOrder) {
        let mut visited = HashSet::with_capacity(fetched.len());
        let mut entries: Vec<T> = fetched
            .into_iter()
            .filter(|e| visited.insert(e.id()))
            .collect();

        if order == FetchOrder::Prepend {
            entries.reverse();
        }

        self.entries = entries;
        self.valid = true;
        self.rebuilds += 1;
        tracing::debug!(
            kind = %T::KIND,
            count = self.entries.len(),
            rebuilds = self.rebuilds,
            "Rebuilt viewport cache"
        );
    }

    /// Stable sort of the current list.
    pub fn sort_by_key<K: Ord>(&mut self, f: impl FnMut(&T) -> K) {
        self.entries.sort_by_key(f);
    }

    /// Force the next non-lazy update to fetch.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Drop the list and everything it was keyed on.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.covered = None;
        self.key = None;
        self.valid = false;
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Inflated rectangle the list was fetched for.
    pub fn covered(&self) -> Option<Rect> {
        self.covered
    }

    /// Number of fills since construction.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MapObjectKind, Vor};

    fn vor(id: i64) -> Vor {
        Vor {
            id,
            ..Default::default()
        }
    }

    fn key() -> QueryKey {
        QueryKey::Point(MapObjectKind::Vor)
    }

    fn normalizer() -> ViewportNormalizer {
        ViewportNormalizer::new(0.3, 0.1)
    }

    fn ids(cache: &SpatialCache<Vor>) -> Vec<i64> {
        cache.entries().iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_first_update_needs_fetch() {
        let mut cache: SpatialCache<Vor> = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        assert!(cache.update(&rect, key(), false, &normalizer()));
        let covered = cache.covered().unwrap();
        assert!(covered.contains(&rect));
        assert!(covered.width() > rect.width());
    }

    #[test]
    fn test_contained_request_reuses_list() {
        let mut cache = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        cache.update(&rect, key(), false, &normalizer());
        cache.fill(vec![vor(1)], FetchOrder::Append);

        // Slight pan inside the overfetched area
        let panned = Rect::new(10.5, 40.5, 20.5, 50.5);
        assert!(!cache.update(&panned, key(), false, &normalizer()));
        assert_eq!(ids(&cache), vec![1]);
    }

    #[test]
    fn test_request_outside_covered_area_clears() {
        let mut cache = SpatialCache::new();
        cache.update(&Rect::new(10.0, 40.0, 20.0, 50.0), key(), false, &normalizer());
        cache.fill(vec![vor(1)], FetchOrder::Append);

        assert!(cache.update(&Rect::new(30.0, 40.0, 40.0, 50.0), key(), false, &normalizer()));
        assert!(cache.entries().is_empty());
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_incompatible_key_clears() {
        let mut cache = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        cache.update(&rect, key(), false, &normalizer());
        cache.fill(vec![vor(1)], FetchOrder::Append);

        let other = QueryKey::Point(MapObjectKind::Ndb);
        assert!(cache.update(&rect, other, false, &normalizer()));
    }

    #[test]
    fn test_lazy_update_never_fetches() {
        let mut cache: SpatialCache<Vor> = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        assert!(!cache.update(&rect, key(), true, &normalizer()));
        assert!(cache.entries().is_empty());
        assert!(cache.covered().is_none());
    }

    #[test]
    fn test_empty_fill_is_valid() {
        let mut cache: SpatialCache<Vor> = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        cache.update(&rect, key(), false, &normalizer());
        cache.fill(Vec::new(), FetchOrder::Append);
        assert!(cache.is_valid());
        assert!(!cache.update(&rect, key(), false, &normalizer()));
    }

    #[test]
    fn test_fill_drops_duplicates_and_orders() {
        let mut cache = SpatialCache::new();
        cache.fill(vec![vor(1), vor(2), vor(1), vor(3)], FetchOrder::Append);
        assert_eq!(ids(&cache), vec![1, 2, 3]);

        cache.fill(vec![vor(1), vor(2), vor(1), vor(3)], FetchOrder::Prepend);
        assert_eq!(ids(&cache), vec![3, 2, 1]);
        assert_eq!(cache.rebuilds(), 2);
    }

    #[test]
    fn test_invalidate_forces_fetch() {
        let mut cache = SpatialCache::new();
        let rect = Rect::new(10.0, 40.0, 20.0, 50.0);
        cache.update(&rect, key(), false, &normalizer());
        cache.fill(vec![vor(1)], FetchOrder::Append);
        cache.invalidate();
        assert!(cache.update(&rect, key(), false, &normalizer()));
    }
}
