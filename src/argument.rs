//! Runtime classification of call arguments for keying.
//!
//! Every parameter of a memoized callable implements [`Argument`], which
//! reports an [`ArgKind`] and writes the argument's key bytes into a
//! [`KeyEncoder`].
//!
//! | Kind | Types | Encoding |
//! |------|-------|----------|
//! | `Signed` | `i8`..`i128`, `isize` | two's complement widened to 64 bits; 16 bytes past `i64` |
//! | `Unsigned` | `u8`..`u128`, `usize`, `char` | raw 64-bit value; 16 bytes past `u64` |
//! | `Float` | `f32`, `f64` | IEEE-754 bits of the `f64` promotion |
//! | `Complex` | `Complex<f32>`, `Complex<f64>` | real bits, then imaginary bits |
//! | `String` | `str`, `String`, `Cow<str>` | raw UTF-8 bytes |
//! | `Bool` | `bool` | one byte, `1` or `0` |
//! | `Address` | `*const T`, `*mut T`, `NonNull<T>`, `Arc<T>`, `Rc<T>` | pointee address |
//! | `Sequence` | `[T]`, `[T; N]`, `Vec<T>`, `VecDeque<T>` | count, then each element length-prefixed |
//! | `Tuple` | `()`, `(A,)` .. `(A, .., H)` | each element length-prefixed |
//! | `Optional` | `Option<T>` | `0`, or `1` then the length-prefixed value |
//! | `Map` | `HashMap<K, V>`, `BTreeMap<K, V>` | count, then entries in byte order |
//! | `Set` | `HashSet<T>`, `BTreeSet<T>` | count, then members in byte order |
//! | `Serialized` | [`Serialized<T>`] | `bincode` bytes, nothing on failure |
//! | `Interned` | [`Interned<T>`] | [`Handle`](crate::ds::Handle) id |
//! | `Opaque` | [`Opaque<T>`] | nothing |
//!
//! References and `Box` delegate to the value they point at; `Arc` and `Rc`
//! are keyed by identity, so two allocations holding equal values produce
//! different keys. Containers key by content: a `Vec<i32>` and an `[i32]`
//! with the same elements share a key, and a `HashMap` keys the same
//! whatever its iteration order.
//!
//! The kind is never written into the key, so values of different kinds
//! whose encodings agree (such as `1i32` and `1u64`) share a key.
//!
//! ## Example Usage
//! ```rust
//! use memokit::argument::{ArgKind, Argument, Interned, Opaque};
//!
//! assert_eq!(42i8.kind(), ArgKind::Signed);
//! assert_eq!("hi".kind(), ArgKind::String);
//! assert_eq!(Interned(vec![1, 2]).kind(), ArgKind::Interned);
//! assert_eq!(Opaque(|| ()).kind(), ArgKind::Opaque);
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::Arc;

use num_complex::Complex;
use serde::Serialize;

use crate::keyer::KeyEncoder;

/// Classification of an argument at keying time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Signed,
    Unsigned,
    Float,
    Complex,
    String,
    Bool,
    /// Keyed by address, not by the value behind it.
    Address,
    Sequence,
    Tuple,
    Optional,
    Map,
    Set,
    Serialized,
    Interned,
    /// Contributes no bytes to the key.
    Opaque,
}

/// A value that can take part in a cache key.
pub trait Argument {
    /// Returns the classification of this value.
    ///
    /// Informational: [`Fnv64aKeyer`](crate::keyer::Fnv64aKeyer) keys on
    /// [`encode`](Self::encode) output alone. Custom keyers may consult it.
    fn kind(&self) -> ArgKind;

    /// Writes the key bytes of this value.
    fn encode(&self, out: &mut KeyEncoder<'_>);
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl Argument for $t {
                #[inline]
                fn kind(&self) -> ArgKind {
                    ArgKind::Signed
                }

                #[inline]
                fn encode(&self, out: &mut KeyEncoder<'_>) {
                    out.write_i64(*self as i64);
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl Argument for $t {
                #[inline]
                fn kind(&self) -> ArgKind {
                    ArgKind::Unsigned
                }

                #[inline]
                fn encode(&self, out: &mut KeyEncoder<'_>) {
                    out.write_u64(*self as u64);
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Argument for i128 {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Signed
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        match i64::try_from(*self) {
            Ok(narrow) => out.write_i64(narrow),
            Err(_) => out.write_bytes(&self.to_le_bytes()),
        }
    }
}

impl Argument for u128 {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Unsigned
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        match u64::try_from(*self) {
            Ok(narrow) => out.write_u64(narrow),
            Err(_) => out.write_bytes(&self.to_le_bytes()),
        }
    }
}

impl Argument for char {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Unsigned
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_u64(u64::from(u32::from(*self)));
    }
}

impl Argument for f32 {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Float
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_f64(f64::from(*self));
    }
}

impl Argument for f64 {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Float
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_f64(*self);
    }
}

impl Argument for Complex<f32> {
    fn kind(&self) -> ArgKind {
        ArgKind::Complex
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_complex(f64::from(self.re), f64::from(self.im));
    }
}

impl Argument for Complex<f64> {
    fn kind(&self) -> ArgKind {
        ArgKind::Complex
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_complex(self.re, self.im);
    }
}

impl Argument for bool {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Bool
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_bool(*self);
    }
}

impl Argument for str {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::String
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_str(self);
    }
}

impl Argument for String {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::String
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_str(self);
    }
}

impl<B> Argument for Cow<'_, B>
where
    B: Argument + ToOwned + ?Sized,
{
    fn kind(&self) -> ArgKind {
        self.as_ref().kind()
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        self.as_ref().encode(out);
    }
}

impl<T: Argument + ?Sized> Argument for &T {
    #[inline]
    fn kind(&self) -> ArgKind {
        (**self).kind()
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        (**self).encode(out);
    }
}

impl<T: Argument + ?Sized> Argument for Box<T> {
    #[inline]
    fn kind(&self) -> ArgKind {
        (**self).kind()
    }

    #[inline]
    fn encode(&self, out: &mut KeyEncoder<'_>) {
        (**self).encode(out);
    }
}

impl<T: ?Sized> Argument for *const T {
    fn kind(&self) -> ArgKind {
        ArgKind::Address
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_addr((*self).cast::<u8>() as usize);
    }
}

impl<T: ?Sized> Argument for *mut T {
    fn kind(&self) -> ArgKind {
        ArgKind::Address
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_addr((*self).cast::<u8>() as usize);
    }
}

impl<T: ?Sized> Argument for NonNull<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Address
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_addr(self.as_ptr().cast::<u8>() as usize);
    }
}

impl<T: ?Sized> Argument for Arc<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Address
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_addr(Arc::as_ptr(self).cast::<u8>() as usize);
    }
}

impl<T: ?Sized> Argument for Rc<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Address
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_addr(Rc::as_ptr(self).cast::<u8>() as usize);
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: Argument> Argument for [T] {
    fn kind(&self) -> ArgKind {
        ArgKind::Sequence
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_sequence(self.iter());
    }
}

impl<T: Argument, const N: usize> Argument for [T; N] {
    fn kind(&self) -> ArgKind {
        ArgKind::Sequence
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_sequence(self.iter());
    }
}

impl<T: Argument> Argument for Vec<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Sequence
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_sequence(self.iter());
    }
}

impl<T: Argument> Argument for VecDeque<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Sequence
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_sequence(self.iter());
    }
}

impl<T: Argument> Argument for Option<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Optional
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        match self {
            Some(value) => {
                out.write_bool(true);
                out.write_element(value);
            },
            None => out.write_bool(false),
        }
    }
}

impl Argument for () {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Tuple
    }

    #[inline]
    fn encode(&self, _out: &mut KeyEncoder<'_>) {}
}

macro_rules! impl_tuple {
    ($($T:ident $idx:tt),+) => {
        impl<$($T: Argument),+> Argument for ($($T,)+) {
            fn kind(&self) -> ArgKind {
                ArgKind::Tuple
            }

            fn encode(&self, out: &mut KeyEncoder<'_>) {
                $(out.write_element(&self.$idx);)+
            }
        }
    };
}

impl_tuple!(A 0);
impl_tuple!(A 0, B 1);
impl_tuple!(A 0, B 1, C 2);
impl_tuple!(A 0, B 1, C 2, D 3);
impl_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

impl<K: Argument, V: Argument, S: BuildHasher> Argument for HashMap<K, V, S> {
    fn kind(&self) -> ArgKind {
        ArgKind::Map
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_unordered(self.iter(), |entry, (k, v)| {
            entry.write_element(k);
            entry.write_element(v);
        });
    }
}

impl<K: Argument, V: Argument> Argument for BTreeMap<K, V> {
    fn kind(&self) -> ArgKind {
        ArgKind::Map
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_unordered(self.iter(), |entry, (k, v)| {
            entry.write_element(k);
            entry.write_element(v);
        });
    }
}

impl<T: Argument, S: BuildHasher> Argument for HashSet<T, S> {
    fn kind(&self) -> ArgKind {
        ArgKind::Set
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_unordered(self.iter(), |entry, member| entry.write_element(member));
    }
}

impl<T: Argument> Argument for BTreeSet<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Set
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_unordered(self.iter(), |entry, member| entry.write_element(member));
    }
}

/// Keys the wrapped value by its `bincode` serialization.
///
/// If serialization fails the argument contributes no bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> Argument for Serialized<T> {
    fn kind(&self) -> ArgKind {
        ArgKind::Serialized
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_serialized(&self.0);
    }
}

/// Keys the wrapped value by its canonical interned handle.
///
/// Equal values always produce the same key bytes. Each distinct value is
/// retained by the keyer's registry for as long as the registry lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Interned<T>(pub T);

impl<T> Argument for Interned<T>
where
    T: Eq + Hash + Clone + Send + 'static,
{
    fn kind(&self) -> ArgKind {
        ArgKind::Interned
    }

    fn encode(&self, out: &mut KeyEncoder<'_>) {
        out.write_interned(&self.0);
    }
}

/// Passes a value through memoization without keying on it.
///
/// Calls that differ only in opaque arguments share a cache entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct Opaque<T>(pub T);

impl<T> Argument for Opaque<T> {
    #[inline]
    fn kind(&self) -> ArgKind {
        ArgKind::Opaque
    }

    #[inline]
    fn encode(&self, _out: &mut KeyEncoder<'_>) {}
}
