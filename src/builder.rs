//! Memoizer configuration.
//!
//! Options are plain values ([`MemoOption`]) so they can be collected,
//! passed around and applied in order; [`MemoizerBuilder`] folds them into a
//! cache and wraps a callable.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use memokit::builder::{MemoOption, MemoizerBuilder};
//! use memokit::store::{CancellationScope, MapCache};
//!
//! let scope = CancellationScope::new();
//! let memo = MemoizerBuilder::new()
//!     .cache(MapCache::new())
//!     .flush_interval(Duration::from_secs(60), &scope)
//!     .try_build(|n: u64| n * n)
//!     .unwrap();
//! assert_eq!(memo.call((12,)), 144);
//!
//! let square = memokit::auto_with(
//!     |n: u64| n * n,
//!     [MemoOption::flush_interval(Duration::from_secs(60), &scope)],
//! );
//! assert_eq!(square(3), 9);
//! scope.cancel();
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;
use crate::memoize::{MemoFn, Memoizer};
use crate::store::flush::{CancellationScope, spawn_flusher};
use crate::store::map::MapCache;
use crate::store::traits::Cache;

/// A single memoizer setting.
pub enum MemoOption<R> {
    /// Store results in this cache instead of a fresh [`MapCache`].
    Cache(Arc<dyn Cache<R>>),
    /// Fully clear the cache every `interval` until `scope` is cancelled.
    FlushInterval {
        interval: Duration,
        scope: CancellationScope,
    },
}

impl<R> MemoOption<R> {
    /// Shorthand for [`MemoOption::Cache`].
    pub fn cache(cache: impl Cache<R> + 'static) -> Self {
        Self::Cache(Arc::new(cache))
    }

    /// Shorthand for [`MemoOption::FlushInterval`].
    pub fn flush_interval(interval: Duration, scope: &CancellationScope) -> Self {
        Self::FlushInterval {
            interval,
            scope: scope.clone(),
        }
    }
}

impl<R> fmt::Debug for MemoOption<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache(cache) => f.debug_tuple("Cache").field(&cache.len()).finish(),
            Self::FlushInterval { interval, scope } => f
                .debug_struct("FlushInterval")
                .field("interval", interval)
                .field("scope", scope)
                .finish(),
        }
    }
}

/// Builder for [`Memoizer`] instances.
pub struct MemoizerBuilder<R> {
    cache: Option<Arc<dyn Cache<R>>>,
    flush: Option<(Duration, CancellationScope)>,
}

impl<R> Default for MemoizerBuilder<R> {
    fn default() -> Self {
        Self {
            cache: None,
            flush: None,
        }
    }
}

impl<R> MemoizerBuilder<R>
where
    R: Clone + Send + Sync + 'static,
{
    /// Creates a builder with the default cache and no flushing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with `options` applied in order.
    pub fn from_options(options: impl IntoIterator<Item = MemoOption<R>>) -> Self {
        options.into_iter().fold(Self::new(), Self::option)
    }

    /// Applies one option. Later options override earlier ones.
    pub fn option(self, option: MemoOption<R>) -> Self {
        match option {
            MemoOption::Cache(cache) => self.shared_cache(cache),
            MemoOption::FlushInterval { interval, scope } => self.flush_interval(interval, &scope),
        }
    }

    /// Uses `cache` as the backing store.
    pub fn cache(self, cache: impl Cache<R> + 'static) -> Self {
        self.shared_cache(Arc::new(cache))
    }

    /// Uses an already shared cache as the backing store.
    pub fn shared_cache(mut self, cache: Arc<dyn Cache<R>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Fully clears the cache every `interval` until `scope` is cancelled.
    pub fn flush_interval(mut self, interval: Duration, scope: &CancellationScope) -> Self {
        self.flush = Some((interval, scope.clone()));
        self
    }

    /// Resolves the configured cache and starts its flusher, if any.
    pub fn try_build_cache(self) -> Result<Arc<dyn Cache<R>>, ConfigError> {
        let (cache, flushing) = self.resolve();
        flushing.map(|()| cache)
    }

    /// Wraps `func`; an invalid flush setting is logged and ignored.
    pub fn build<F, Args>(self, func: F) -> Memoizer<F, Args>
    where
        F: MemoFn<Args, Output = R>,
    {
        let (cache, flushing) = self.resolve();
        if let Err(err) = flushing {
            warn!(error = %err, "periodic flush disabled");
        }
        Memoizer::from_parts(func, cache)
    }

    /// Wraps `func`, failing on an invalid flush setting.
    pub fn try_build<F, Args>(self, func: F) -> Result<Memoizer<F, Args>, ConfigError>
    where
        F: MemoFn<Args, Output = R>,
    {
        let cache = self.try_build_cache()?;
        Ok(Memoizer::from_parts(func, cache))
    }

    fn resolve(self) -> (Arc<dyn Cache<R>>, Result<(), ConfigError>) {
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MapCache::<R>::new()));
        let flushing = match &self.flush {
            Some((interval, scope)) => {
                spawn_flusher(Arc::downgrade(&cache), |cache| cache.clear(), *interval, scope)
            },
            None => Ok(()),
        };
        (cache, flushing)
    }
}
