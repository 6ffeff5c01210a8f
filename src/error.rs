//! Error types for the memokit library.
//!
//! Memoized calls and cache operations never fail; the only fallible
//! surface is configuration.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when memoizer or store configuration is
//!   invalid (e.g. a zero flush interval) or cannot be applied.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//!
//! use memokit::error::ConfigError;
//! use memokit::store::flush::CancellationScope;
//! use memokit::store::map::MapCache;
//!
//! let scope = CancellationScope::new();
//! let bad: Result<MapCache<u8>, ConfigError> =
//!     MapCache::new().try_with_flush(Duration::ZERO, &scope);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`MapCache::try_with_flush`](crate::store::map::MapCache::try_with_flush)
/// and [`MemoizerBuilder::try_build`](crate::builder::MemoizerBuilder::try_build).
/// Carries a human-readable description of what failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
