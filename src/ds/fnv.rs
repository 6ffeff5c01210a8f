//! Incremental 64-bit FNV-1a accumulator.
//!
//! ## Architecture
//!
//! ```text
//!   state = 0xcbf29ce484222325                 (offset basis)
//!
//!   for each byte b:
//!       state = (state ^ b) * 0x100000001b3    (mod 2^64)
//!
//!   sum() = state                              (no final mixing)
//! ```
//!
//! ## Key Components
//! - [`Fnv64a`]: the accumulator. Absorbs single bytes, byte slices and
//!   little-endian `u64` values; [`Fnv64a::sum`] is non-destructive so
//!   absorption may continue afterwards.
//!
//! ## Example Usage
//! ```rust
//! use memokit::ds::Fnv64a;
//!
//! let mut h = Fnv64a::new();
//! h.write_bytes(b"a");
//! assert_eq!(h.sum(), 0xaf63_dc4c_8601_ec8c);
//! ```
//!
//! ## Implementation Notes
//! - Not a cryptographic hash. Keys derived from it are subject to the
//!   birthday bound of a 64-bit digest.
//! - Also implements [`std::hash::Hasher`], so `Hash` types can feed it.

use std::hash::Hasher;

/// FNV-1a 64-bit offset basis.
pub const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
pub const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Order-sensitive FNV-1a accumulator over a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv64a {
    state: u64,
}

impl Fnv64a {
    /// Creates an accumulator initialized to the offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Resets the state to the offset basis.
    #[inline]
    pub fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }

    /// Absorbs one byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.state ^= u64::from(byte);
        self.state = self.state.wrapping_mul(FNV_PRIME);
    }

    /// Absorbs every byte of `bytes` in order.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Absorbs the 8 bytes of `value`, least significant first.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        for byte in value.to_le_bytes() {
            self.write_byte(byte);
        }
    }

    /// Returns the current digest.
    #[inline]
    pub fn sum(&self) -> u64 {
        self.state
    }
}

impl Default for Fnv64a {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv64a {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.write_bytes(bytes);
    }

    #[inline]
    fn write_u8(&mut self, byte: u8) {
        self.write_byte(byte);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors from the FNV-1a 64-bit test suite.
    #[test]
    fn known_vectors() {
        assert_eq!(Fnv64a::new().sum(), 0xcbf2_9ce4_8422_2325);

        let mut h = Fnv64a::new();
        h.write_bytes(b"a");
        assert_eq!(h.sum(), 0xaf63_dc4c_8601_ec8c);

        let mut h = Fnv64a::new();
        h.write_bytes(b"foobar");
        assert_eq!(h.sum(), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn write_u64_is_little_endian_bytes() {
        let value = 0x0102_0304_0506_0708u64;
        let mut a = Fnv64a::new();
        a.write_u64(value);
        let mut b = Fnv64a::new();
        b.write_bytes(&[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(a.sum(), b.sum());
    }

    #[test]
    fn sum_is_non_destructive() {
        let mut h = Fnv64a::new();
        h.write_bytes(b"foo");
        let first = h.sum();
        assert_eq!(h.sum(), first);
        h.write_bytes(b"bar");

        let mut whole = Fnv64a::new();
        whole.write_bytes(b"foobar");
        assert_eq!(h.sum(), whole.sum());
    }

    #[test]
    fn absorption_is_order_sensitive() {
        let mut ab = Fnv64a::new();
        ab.write_byte(1);
        ab.write_byte(2);
        let mut ba = Fnv64a::new();
        ba.write_byte(2);
        ba.write_byte(1);
        assert_ne!(ab.sum(), ba.sum());
    }

    #[test]
    fn reset_restores_offset_basis() {
        let mut h = Fnv64a::new();
        h.write_bytes(b"state");
        h.reset();
        assert_eq!(h, Fnv64a::default());
    }

    #[test]
    fn hasher_impl_matches_inherent_writes() {
        use std::hash::Hash;

        let mut via_trait = Fnv64a::new();
        0xdead_beefu32.hash(&mut via_trait);
        let mut direct = Fnv64a::new();
        direct.write_bytes(&0xdead_beefu32.to_ne_bytes());
        assert_eq!(via_trait.finish(), direct.sum());
    }
}
