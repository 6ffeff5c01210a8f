//! HashMap-backed [`Cache`] implementation.
//!
//! ## Architecture
//! - Entries live in one `FxHashMap<K::Key, R>` behind a single `RwLock`.
//! - Keys are derived by a [`Keyer`] while the lock is held: `get` and `len`
//!   take the shared lock, `set` and `clear` the exclusive one.
//! - `MapCache` is a handle around `Arc`'d state; clones share entries.
//!
//! ## Core Operations
//! - `get`: look up results for an argument list.
//! - `set`: store results, overwriting any entry with the same key.
//! - `clear`: drop every entry (the only eviction there is).
//! - `len`: current entry count.
//!
//! ## Example Usage
//! ```rust
//! use memokit::store::map::MapCache;
//! use memokit::store::traits::Cache;
//!
//! let cache: MapCache<u32> = MapCache::new();
//! cache.set(&[&1, &"one"], 11);
//! assert_eq!(cache.get(&[&1u64, &"one"]), Some(11));
//! assert_eq!(cache.get(&[&2, &"one"]), None);
//! cache.clear();
//! assert!(cache.is_empty());
//! ```
//!
//! ## Thread Safety
//! - `MapCache` is `Send + Sync` when `R` is.
//! - No single-flight: two threads missing on the same key both compute and
//!   the later `set` wins.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::argument::Argument;
use crate::error::ConfigError;
use crate::keyer::{Fnv64aKeyer, Keyer};
use crate::store::flush::{CancellationScope, spawn_flusher};
use crate::store::traits::{Cache, StoreMetrics};

/// Store counters, updated with relaxed atomics.
#[derive(Debug, Default)]
struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    clears: AtomicU64,
}

impl StoreCounters {
    fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }

    #[inline]
    fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct MapCacheInner<R, K: Keyer> {
    map: RwLock<FxHashMap<K::Key, R>>,
    keyer: K,
    metrics: StoreCounters,
}

impl<R, K: Keyer> MapCacheInner<R, K> {
    fn clear(&self) {
        self.map.write().clear();
        StoreCounters::inc(&self.metrics.clears);
    }
}

/// Concurrent key to result map, keyed by a pluggable [`Keyer`].
pub struct MapCache<R, K: Keyer = Fnv64aKeyer> {
    inner: Arc<MapCacheInner<R, K>>,
}

impl<R> MapCache<R, Fnv64aKeyer> {
    /// Creates an empty store using the default FNV-1a keyer.
    pub fn new() -> Self {
        Self::with_keyer(Fnv64aKeyer::new())
    }
}

impl<R> Default for MapCache<R, Fnv64aKeyer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, K: Keyer> MapCache<R, K> {
    /// Creates an empty store deriving keys with `keyer`.
    pub fn with_keyer(keyer: K) -> Self {
        Self {
            inner: Arc::new(MapCacheInner {
                map: RwLock::new(FxHashMap::default()),
                keyer,
                metrics: StoreCounters::default(),
            }),
        }
    }

    /// Returns the keyer.
    pub fn keyer(&self) -> &K {
        &self.inner.keyer
    }

    /// Snapshot store metrics.
    pub fn metrics(&self) -> StoreMetrics {
        self.inner.metrics.snapshot()
    }
}

impl<R, K> MapCache<R, K>
where
    R: Send + Sync + 'static,
    K: Keyer + 'static,
{
    /// Enables a full flush every `interval` until `scope` is cancelled.
    ///
    /// An invalid configuration is logged and ignored; use
    /// [`try_with_flush`](Self::try_with_flush) to observe it.
    pub fn with_flush(self, interval: Duration, scope: &CancellationScope) -> Self {
        if let Err(err) = self.start_flush(interval, scope) {
            warn!(error = %err, "periodic flush disabled");
        }
        self
    }

    /// Enables a full flush every `interval` until `scope` is cancelled.
    pub fn try_with_flush(
        self,
        interval: Duration,
        scope: &CancellationScope,
    ) -> Result<Self, ConfigError> {
        self.start_flush(interval, scope)?;
        Ok(self)
    }

    fn start_flush(&self, interval: Duration, scope: &CancellationScope) -> Result<(), ConfigError> {
        spawn_flusher(
            Arc::downgrade(&self.inner),
            MapCacheInner::clear,
            interval,
            scope,
        )
    }
}

impl<R, K: Keyer> Clone for MapCache<R, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, K: Keyer + fmt::Debug> fmt::Debug for MapCache<R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapCache")
            .field("len", &self.inner.map.read().len())
            .field("keyer", &self.inner.keyer)
            .field("metrics", &self.metrics())
            .finish()
    }
}

impl<R, K> Cache<R> for MapCache<R, K>
where
    R: Clone + Send + Sync,
    K: Keyer,
{
    fn get(&self, args: &[&dyn Argument]) -> Option<R> {
        let map = self.inner.map.read();
        let key = self.inner.keyer.key(args);
        match map.get(&key).cloned() {
            Some(results) => {
                StoreCounters::inc(&self.inner.metrics.hits);
                Some(results)
            },
            None => {
                StoreCounters::inc(&self.inner.metrics.misses);
                None
            },
        }
    }

    fn set(&self, args: &[&dyn Argument], results: R) {
        let mut map = self.inner.map.write();
        let key = self.inner.keyer.key(args);
        if map.insert(key, results).is_some() {
            StoreCounters::inc(&self.inner.metrics.updates);
        } else {
            StoreCounters::inc(&self.inner.metrics.inserts);
        }
    }

    fn clear(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.map.read().len()
    }
}
