//! Derivation of cache keys from argument lists.
//!
//! ## Architecture
//!
//! ```text
//!   args: [&dyn Argument]
//!        │
//!        ▼   for each argument
//!   ┌──────────────────────────────────────────────┐
//!   │ scratch.clear()                              │
//!   │ arg.encode(KeyEncoder { scratch, registry }) │
//!   │ fnv.write_u64(scratch.len())   length prefix │
//!   │ fnv.write_bytes(scratch)                     │
//!   └──────────────────────────────────────────────┘
//!        │
//!        ▼
//!   fnv.sum()  ->  u64 cache key
//! ```
//!
//! ## Key Components
//! - [`Keyer`]: contract for anything that turns an argument list into an
//!   equatable key. Implemented for plain closures.
//! - [`Fnv64aKeyer`]: default keyer producing a `u64` FNV-1a digest.
//! - [`KeyEncoder`]: sink handed to [`Argument::encode`].
//!
//! ## Implementation Notes
//! - Each argument is length-prefixed, so argument boundaries are
//!   unambiguous: `("ab", "c")` and `("a", "bc")` yield different keys.
//! - Opaque arguments still contribute their zero length prefix, so the
//!   number of arguments always affects the key.
//! - Keys are 64-bit digests. Distinct argument lists can collide with
//!   birthday-bound probability; a collision is treated as a hit.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::argument::Argument;
use crate::ds::{Fnv64a, InternRegistry};

/// Turns an argument list into a cache key.
///
/// Implementations must be safe to call from several threads at once.
pub trait Keyer: Send + Sync {
    /// Key type stored by the cache.
    type Key: Eq + Hash + Send + Sync;

    /// Derives the key for `args`.
    fn key(&self, args: &[&dyn Argument]) -> Self::Key;
}

impl<F, K> Keyer for F
where
    F: Fn(&[&dyn Argument]) -> K + Send + Sync,
    K: Eq + Hash + Send + Sync,
{
    type Key = K;

    #[inline]
    fn key(&self, args: &[&dyn Argument]) -> K {
        self(args)
    }
}

/// Default keyer: length-prefixed FNV-1a over each argument's encoding.
#[derive(Clone)]
pub struct Fnv64aKeyer {
    registry: Arc<InternRegistry>,
}

impl Fnv64aKeyer {
    /// Creates a keyer backed by the process-wide intern registry.
    pub fn new() -> Self {
        Self::with_registry(InternRegistry::global())
    }

    /// Creates a keyer backed by a private intern registry.
    pub fn with_registry(registry: Arc<InternRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry holding interned argument values.
    pub fn registry(&self) -> &Arc<InternRegistry> {
        &self.registry
    }
}

impl Default for Fnv64aKeyer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Fnv64aKeyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fnv64aKeyer")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Keyer for Fnv64aKeyer {
    type Key = u64;

    fn key(&self, args: &[&dyn Argument]) -> u64 {
        let mut hasher = Fnv64a::new();
        let mut scratch = Vec::new();
        for arg in args {
            scratch.clear();
            arg.encode(&mut KeyEncoder::new(&mut scratch, &self.registry));
            hasher.write_u64(scratch.len() as u64);
            hasher.write_bytes(&scratch);
        }
        hasher.sum()
    }
}

/// Byte sink for one argument's key encoding.
pub struct KeyEncoder<'a> {
    buf: &'a mut Vec<u8>,
    registry: &'a InternRegistry,
}

impl<'a> KeyEncoder<'a> {
    /// Creates an encoder appending to `buf` and interning through `registry`.
    pub fn new(buf: &'a mut Vec<u8>, registry: &'a InternRegistry) -> Self {
        Self { buf, registry }
    }

    /// Appends raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Appends the real part, then the imaginary part.
    #[inline]
    pub fn write_complex(&mut self, re: f64, im: f64) {
        self.write_f64(re);
        self.write_f64(im);
    }

    #[inline]
    pub fn write_str(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    #[inline]
    pub fn write_addr(&mut self, addr: usize) {
        self.write_u64(addr as u64);
    }

    /// Appends `element`'s encoding behind its `u64` byte length.
    pub fn write_element<A: Argument + ?Sized>(&mut self, element: &A) {
        let start = self.buf.len();
        self.write_u64(0);
        element.encode(&mut KeyEncoder::new(&mut *self.buf, self.registry));
        let len = (self.buf.len() - start - 8) as u64;
        self.buf[start..start + 8].copy_from_slice(&len.to_le_bytes());
    }

    /// Appends the item count, then each item as an element.
    pub fn write_sequence<'e, T, I>(&mut self, items: I)
    where
        T: Argument + 'e,
        I: ExactSizeIterator<Item = &'e T>,
    {
        self.write_u64(items.len() as u64);
        for item in items {
            self.write_element(item);
        }
    }

    /// Appends entries whose iteration order carries no meaning.
    ///
    /// Each entry is encoded on its own by `encode`; the encodings are then
    /// sorted so equal collections yield equal bytes.
    pub fn write_unordered<I, F>(&mut self, entries: I, mut encode: F)
    where
        I: IntoIterator,
        F: FnMut(&mut KeyEncoder<'_>, I::Item),
    {
        let registry = self.registry;
        let mut chunks: Vec<Vec<u8>> = entries
            .into_iter()
            .map(|entry| {
                let mut chunk = Vec::new();
                encode(&mut KeyEncoder::new(&mut chunk, registry), entry);
                chunk
            })
            .collect();
        chunks.sort_unstable();
        self.write_u64(chunks.len() as u64);
        for chunk in &chunks {
            self.write_u64(chunk.len() as u64);
            self.write_bytes(chunk);
        }
    }

    /// Appends the `bincode` encoding of `value`; appends nothing on error.
    pub fn write_serialized<T: Serialize + ?Sized>(&mut self, value: &T) {
        match bincode::serialize(value) {
            Ok(bytes) => self.write_bytes(&bytes),
            Err(err) => {
                debug!(
                    error = %err,
                    ty = std::any::type_name::<T>(),
                    "argument serialization failed; excluded from key"
                );
            },
        }
    }

    /// Appends the id of the canonical handle for `value`.
    pub fn write_interned<T>(&mut self, value: &T)
    where
        T: Eq + Hash + Clone + Send + 'static,
    {
        let handle = self.registry.intern(value);
        self.write_u64(handle.id());
    }
}
