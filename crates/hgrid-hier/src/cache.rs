//! Two-tier distance cache.
//!
//! The fast tier is a concurrent in-memory map; the optional durable tier is
//! any [`DistanceStore`]. Writes go to both tiers, reads fall back to the
//! store and backfill memory on a hit. A failing store never loses a write
//! for the rest of the process: the value stays in memory and the cache is
//! marked degraded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hgrid_core::Point;

use crate::Error;
use crate::key::PairKey;
use crate::store::DistanceStore;

/// Counters describing how lookups were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub store_hits: u64,
    pub misses: u64,
    pub writes: u64,
}

#[derive(Default)]
struct Counters {
    memory_hits: AtomicU64,
    store_hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// Distance cache keyed by unordered vertex pair and level.
///
/// Borrows its durable store, so the store outlives every cache built on
/// it and is closed by its owner.
pub struct DistanceCache<'s> {
    memory: DashMap<PairKey, i32>,
    store: Option<&'s dyn DistanceStore>,
    degraded: AtomicBool,
    counters: Counters,
}

impl Default for DistanceCache<'_> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<'s> DistanceCache<'s> {
    /// A cache without a durable tier.
    pub fn in_memory() -> Self {
        Self {
            memory: DashMap::new(),
            store: None,
            degraded: AtomicBool::new(false),
            counters: Counters::default(),
        }
    }

    /// A cache writing through to `store`.
    pub fn with_store(store: &'s dyn DistanceStore) -> Self {
        Self {
            store: Some(store),
            ..Self::in_memory()
        }
    }

    /// Cached distance between `a` and `b` at `level`, in either order.
    pub fn get(&self, a: Point, b: Point, level: u32) -> Option<i32> {
        let key = PairKey::new(a, b, level);
        if let Some(d) = self.memory.get(&key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            return Some(*d);
        }

        let found = match self.store.map(|s| s.fetch(key)) {
            Some(Ok(found)) => found,
            Some(Err(e)) => {
                self.store_failed(&e);
                None
            }
            None => None,
        };

        match found {
            Some(d) => {
                self.counters.store_hits.fetch_add(1, Ordering::Relaxed);
                let d = *self.memory.entry(key).or_insert(d);
                Some(d)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Record the distance between `a` and `b` at `level` in both tiers.
    pub fn put(&self, a: Point, b: Point, level: u32, distance: i32) {
        let key = PairKey::new(a, b, level);
        if !self.remember(key, distance) {
            return;
        }
        if let Some(store) = self.store {
            if let Err(e) = store.upsert(key, distance) {
                self.store_failed(&e);
            }
        }
    }

    /// Record many `(a, b, distance)` triples at `level` with one store write.
    pub fn put_batch(&self, level: u32, entries: &[(Point, Point, i32)]) {
        let fresh: Vec<(PairKey, i32)> = entries
            .iter()
            .map(|&(a, b, d)| (PairKey::new(a, b, level), d))
            .filter(|&(key, d)| self.remember(key, d))
            .collect();
        if fresh.is_empty() {
            return;
        }
        if let Some(store) = self.store {
            if let Err(e) = store.upsert_batch(&fresh) {
                self.store_failed(&e);
            }
        }
    }

    /// Insert into memory. Returns `false` when the key was already present.
    ///
    /// An existing value is never replaced: readers may already have seen it.
    fn remember(&self, key: PairKey, distance: i32) -> bool {
        match self.memory.entry(key) {
            Entry::Occupied(e) => {
                if *e.get() != distance {
                    log::warn!(
                        "conflicting distance for {key}: kept {}, ignored {distance}",
                        e.get()
                    );
                }
                false
            }
            Entry::Vacant(e) => {
                e.insert(distance);
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
                true
            }
        }
    }

    fn store_failed(&self, err: &Error) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            log::warn!("distance store unavailable, continuing in memory only: {err}");
        } else {
            log::debug!("distance store still unavailable: {err}");
        }
    }

    /// Number of entries in the in-memory tier.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Whether the durable tier has failed at least once.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            store_hits: self.counters.store_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::store::MemoryStore;

    /// A store whose backend is gone.
    struct Offline;

    impl DistanceStore for Offline {
        fn upsert(&self, _key: PairKey, _distance: i32) -> Result<()> {
            Err(Error::Unavailable("connection refused".into()))
        }

        fn fetch(&self, _key: PairKey) -> Result<Option<i32>> {
            Err(Error::Unavailable("connection refused".into()))
        }

        fn records(&self) -> Result<Vec<(PairKey, i32)>> {
            Err(Error::Unavailable("connection refused".into()))
        }
    }

    const A: Point = Point::new(0, 0);
    const B: Point = Point::new(3, 4);

    #[test]
    fn test_get_is_symmetric() {
        let cache = DistanceCache::in_memory();
        cache.put(B, A, 1, 7);
        assert_eq!(cache.get(A, B, 1), Some(7));
        assert_eq!(cache.get(B, A, 1), Some(7));
        assert_eq!(cache.get(A, B, 0), None);
    }

    #[test]
    fn test_put_writes_through() {
        let store = MemoryStore::new();
        let cache = DistanceCache::with_store(&store);
        cache.put(A, B, 2, 9);
        assert_eq!(store.fetch(PairKey::new(A, B, 2)).unwrap(), Some(9));
    }

    #[test]
    fn test_store_hit_backfills_memory() {
        let store = MemoryStore::new();
        store.upsert(PairKey::new(A, B, 0), 5).unwrap();

        let cache = DistanceCache::with_store(&store);
        assert!(cache.is_empty());
        assert_eq!(cache.get(B, A, 0), Some(5));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(A, B, 0), Some(5));

        let stats = cache.stats();
        assert_eq!(stats.store_hits, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[test]
    fn test_idempotent_put() {
        let store = MemoryStore::new();
        let cache = DistanceCache::with_store(&store);
        cache.put(A, B, 0, 4);
        cache.put(B, A, 0, 4);
        assert_eq!(cache.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(cache.stats().writes, 1);
    }

    #[test]
    fn test_conflicting_put_keeps_served_value() {
        let cache = DistanceCache::in_memory();
        cache.put(A, B, 0, 4);
        assert_eq!(cache.get(A, B, 0), Some(4));
        cache.put(A, B, 0, 8);
        assert_eq!(cache.get(A, B, 0), Some(4));
    }

    #[test]
    fn test_offline_store_keeps_writes_in_memory() {
        let offline = Offline;
        let cache = DistanceCache::with_store(&offline);
        cache.put(A, B, 3, 11);
        cache.put_batch(3, &[(A, Point::new(1, 0), 1)]);
        assert!(cache.is_degraded());
        assert_eq!(cache.get(A, B, 3), Some(11));
        assert_eq!(cache.get(Point::new(1, 0), A, 3), Some(1));
        // A miss with a dead store is still just a miss.
        assert_eq!(cache.get(A, B, 4), None);
    }

    #[test]
    fn test_put_batch_skips_known_keys() {
        let store = MemoryStore::new();
        let cache = DistanceCache::with_store(&store);
        cache.put(A, B, 1, 7);
        cache.put_batch(1, &[(B, A, 7), (A, Point::new(0, 1), 1)]);
        assert_eq!(cache.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(cache.stats().writes, 2);
    }

    #[test]
    fn test_concurrent_writers_agree() {
        let cache = DistanceCache::in_memory();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for x in 0..50 {
                        cache.put(A, Point::new(x, 0), 0, x);
                    }
                });
            }
        });
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.get(Point::new(49, 0), A, 0), Some(49));
    }
}
