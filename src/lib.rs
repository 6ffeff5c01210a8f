//! memokit: transparent memoization of arbitrary callables.
//!
//! A callable of up to eight parameters is wrapped so that repeated calls
//! with equal arguments return stored results instead of re-running it.
//!
//! ## Architecture
//!
//! ```text
//!   memoize::{auto, manual}          builder::MemoizerBuilder
//!            │                                │ options
//!            ▼                                ▼
//!   memoize::Memoizer ────────────► store::traits::Cache
//!            │                                │
//!            │ argument::Argument             ▼
//!            └────────────────────► store::map::MapCache ◄── store::flush
//!                                             │
//!                                             ▼
//!                                    keyer::Fnv64aKeyer
//!                                             │
//!                                             ▼
//!                               ds::{Fnv64a, InternRegistry}
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&calls);
//! let greet = memokit::auto(move |name: String, excited: bool| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//!     format!("hello {name}{}", if excited { "!" } else { "" })
//! });
//!
//! assert_eq!(greet("ada".into(), true), "hello ada!");
//! assert_eq!(greet("ada".into(), true), "hello ada!");
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

pub mod argument;
pub mod builder;
pub mod ds;
pub mod error;
pub mod keyer;
pub mod memoize;
pub mod prelude;
pub mod store;

pub use crate::argument::{ArgKind, Argument, Interned, Opaque, Serialized};
pub use crate::builder::{MemoOption, MemoizerBuilder};
pub use crate::error::ConfigError;
pub use crate::keyer::{Fnv64aKeyer, Keyer};
pub use crate::memoize::{MemoFn, Memoizer, Signature, auto, auto_with, manual, manual_with};
pub use crate::store::{Cache, CancellationScope, MapCache, StoreMetrics};
