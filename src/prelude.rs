pub use crate::argument::{Argument, Interned, Opaque, Serialized};
pub use crate::builder::{MemoOption, MemoizerBuilder};
pub use crate::error::ConfigError;
pub use crate::keyer::{Fnv64aKeyer, Keyer};
pub use crate::memoize::{auto, auto_with, manual, manual_with};
pub use crate::store::{Cache, CancellationScope, MapCache};
