//! Storage contract for memoized results.
//!
//! A [`Cache`] maps argument lists to stored results. How an argument list
//! becomes a key is up to the implementation; [`MapCache`](crate::store::map::MapCache)
//! delegates to a [`Keyer`](crate::keyer::Keyer).
//!
//! Implementations must be safe for concurrent use and must never fail from
//! [`Cache::get`] or [`Cache::set`]: a backing-store fault is absorbed and
//! shows up as an ordinary miss.

use crate::argument::Argument;

/// Snapshot of store-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    pub hits: u64,
    pub misses: u64,
    /// Sets that created a new entry.
    pub inserts: u64,
    /// Sets that replaced an existing entry.
    pub updates: u64,
    pub clears: u64,
}

/// Concurrent argument-list to result store.
pub trait Cache<R>: Send + Sync {
    /// Returns the stored results for `args`, if any.
    fn get(&self, args: &[&dyn Argument]) -> Option<R>;

    /// Stores `results` for `args`, replacing any previous entry.
    fn set(&self, args: &[&dyn Argument], results: R);

    /// Removes every entry.
    fn clear(&self);

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
