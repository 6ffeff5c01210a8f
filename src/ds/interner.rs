//! Value interning for keys that are equatable but have no byte encoding.
//!
//! ## Architecture
//!
//! ```text
//!   InternRegistry (process-wide, Mutex)
//!   ├── next: u64                         monotonic handle counter
//!   └── tables: TypeId -> KeyInterner<T>  one table per interned type
//!                          ├── index: T -> Handle
//!                          └── keys:  [(Handle, T)]   append-only
//! ```
//!
//! ## Key Components
//! - [`Handle`]: canonical identity of an interned value. Equal values of
//!   the same type always resolve to the same handle; values of different
//!   types never share one.
//! - [`KeyInterner`]: single-type table mapping values to handles.
//! - [`InternRegistry`]: type-erased set of tables guarded by one mutex.
//!   [`InternRegistry::global`] is the instance shared by every default keyer.
//!
//! ## Implementation Notes
//! - Tables are append-only. Nothing is ever removed, so a handle stays
//!   valid (and keeps its value alive) for the lifetime of the registry.
//! - Memory grows with the number of distinct interned values.

use std::any::{Any, TypeId};
use std::hash::Hash;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

static GLOBAL: Lazy<Arc<InternRegistry>> = Lazy::new(|| Arc::new(InternRegistry::new()));

/// Canonical identity of an interned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Wraps a raw id, for tables fed by an external allocator.
    #[inline]
    pub const fn from_id(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw handle id.
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Append-only interner assigning a [`Handle`] to each unique key.
#[derive(Debug)]
pub struct KeyInterner<K> {
    index: FxHashMap<K, Handle>,
    keys: Vec<(Handle, K)>,
}

impl<K> Default for KeyInterner<K> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            keys: Vec::new(),
        }
    }
}

impl<K> KeyInterner<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, inserting it if missing.
    ///
    /// `allocate` is only called for unseen keys and must return handles in
    /// strictly increasing order across calls.
    pub fn intern(&mut self, key: &K, allocate: impl FnOnce() -> Handle) -> Handle {
        if let Some(&handle) = self.index.get(key) {
            return handle;
        }
        let handle = allocate();
        debug_assert!(self.keys.last().is_none_or(|(last, _)| *last < handle));
        self.keys.push((handle, key.clone()));
        self.index.insert(key.clone(), handle);
        handle
    }

    /// Returns the handle for `key` if it exists.
    pub fn get_handle(&self, key: &K) -> Option<Handle> {
        self.index.get(key).copied()
    }

    /// Resolves a handle to its original key.
    pub fn resolve(&self, handle: Handle) -> Option<&K> {
        self.keys
            .binary_search_by_key(&handle, |(h, _)| *h)
            .ok()
            .map(|pos| &self.keys[pos].1)
    }

    /// Returns the number of interned keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no keys are interned.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Default)]
struct RegistryInner {
    next: u64,
    tables: FxHashMap<TypeId, Box<dyn Any + Send>>,
}

/// Type-erased, thread-safe collection of [`KeyInterner`] tables.
#[derive(Default)]
pub struct InternRegistry {
    inner: Mutex<RegistryInner>,
}

impl InternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> Arc<InternRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the canonical handle for `value`, creating it on first sight.
    pub fn intern<T>(&self, value: &T) -> Handle
    where
        T: Eq + Hash + Clone + Send + 'static,
    {
        let mut guard = self.inner.lock();
        let RegistryInner { next, tables } = &mut *guard;
        let Some(table) = tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(KeyInterner::<T>::new()))
            .downcast_mut::<KeyInterner<T>>()
        else {
            unreachable!("tables are keyed by the TypeId of their element type");
        };
        table.intern(value, || {
            let handle = Handle(*next);
            *next += 1;
            handle
        })
    }

    /// Returns the handle for `value` without interning it.
    pub fn lookup<T>(&self, value: &T) -> Option<Handle>
    where
        T: Eq + Hash + Clone + Send + 'static,
    {
        let guard = self.inner.lock();
        guard
            .tables
            .get(&TypeId::of::<T>())?
            .downcast_ref::<KeyInterner<T>>()?
            .get_handle(value)
    }

    /// Returns a copy of the value behind `handle`, if it belongs to `T`.
    pub fn resolve<T>(&self, handle: Handle) -> Option<T>
    where
        T: Eq + Hash + Clone + Send + 'static,
    {
        let guard = self.inner.lock();
        guard
            .tables
            .get(&TypeId::of::<T>())?
            .downcast_ref::<KeyInterner<T>>()?
            .resolve(handle)
            .cloned()
    }

    /// Total number of handles ever created.
    pub fn len(&self) -> usize {
        self.inner.lock().next as usize
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InternRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.inner.lock();
        f.debug_struct("InternRegistry")
            .field("handles", &guard.next)
            .field("types", &guard.tables.len())
            .finish()
    }
}
