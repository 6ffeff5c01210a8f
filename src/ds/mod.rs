pub mod fnv;
pub mod interner;

pub use fnv::{FNV_OFFSET_BASIS, FNV_PRIME, Fnv64a};
pub use interner::{Handle, InternRegistry, KeyInterner};
