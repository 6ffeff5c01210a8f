//! Result storage for memoized callables.
//!
//! [`traits::Cache`] is the contract a memoizer talks to;
//! [`map::MapCache`] is the default implementation and
//! [`flush`] provides its optional periodic full flush.

pub mod flush;
pub mod map;
pub mod traits;

pub use flush::CancellationScope;
pub use map::MapCache;
pub use traits::{Cache, StoreMetrics};
