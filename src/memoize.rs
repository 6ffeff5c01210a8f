//! Memoizing wrappers for callables of any arity.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► wrapped(a, b, …)
//!                 │
//!                 ▼
//!           Memoizer::call((a, b, …))
//!                 │   F::arguments(&args)  ->  [&dyn Argument]
//!                 ▼
//!           cache.get(args) ── hit ──► stored results
//!                 │ miss
//!                 ▼
//!           func(a, b, …)  ──► cache.set(args, results) ──► results
//! ```
//!
//! [`MemoFn`] is implemented for every `Fn(A1, …, An) -> R + Send + Sync`
//! with up to eight parameters. It captures the callable's [`Signature`] and
//! knows how to rebuild a boxed closure of the very same shape, which is
//! what [`auto`] and [`manual`] hand back.
//!
//! ## Modes
//! - Automatic: the key is derived from the actual arguments of each call.
//! - Manual: the caller supplies a key up front and every call made through
//!   the returned callable uses it, whatever arguments are passed.
//!
//! ## Example Usage
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//!
//! let total = Arc::new(AtomicI64::new(0));
//! let counter = Arc::clone(&total);
//! let add = memokit::auto(move |x: i64| {
//!     counter.fetch_add(x, Ordering::SeqCst);
//! });
//!
//! add(100);
//! add(1);
//! add(1);
//! assert_eq!(total.load(Ordering::SeqCst), 101);
//! ```
//!
//! ## Policy
//! - Results are cached whatever they encode, `Err` values included.
//! - Panics from the wrapped callable propagate and nothing is stored.
//! - Concurrent misses on one key may both run the callable; the later
//!   store wins.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::argument::Argument;
use crate::builder::{MemoOption, MemoizerBuilder};
use crate::store::traits::Cache;

/// Shape of a memoized callable, captured when it is wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<&'static str>,
    output: &'static str,
}

impl Signature {
    pub fn new(params: Vec<&'static str>, output: &'static str) -> Self {
        Self { params, output }
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter type names, in order.
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    /// Output type name.
    pub fn output(&self) -> &'static str {
        self.output
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        write!(f, ") -> {}", self.output)
    }
}

/// A callable that can be memoized, taking its arguments as the tuple `Args`.
pub trait MemoFn<Args>: Send + Sync + 'static {
    /// Result type; cloned out of the cache on every hit.
    type Output: Clone + Send + Sync + 'static;

    /// Boxed callable with the same parameters and output as `Self`.
    type Wrapped;

    /// Describes the callable's parameters and output.
    fn signature() -> Signature;

    /// Calls the underlying callable.
    fn invoke(&self, args: Args) -> Self::Output;

    /// Borrows each argument for keying.
    fn arguments(args: &Args) -> Vec<&dyn Argument>;

    /// Rebuilds the original calling convention around a tuple-taking closure.
    fn wrap<C>(call: C) -> Self::Wrapped
    where
        C: Fn(Args) -> Self::Output + Send + Sync + 'static;
}

macro_rules! impl_memo_fn {
    ($($A:ident $a:ident),*) => {
        impl<Func, Out, $($A,)*> MemoFn<($($A,)*)> for Func
        where
            Func: Fn($($A),*) -> Out + Send + Sync + 'static,
            Out: Clone + Send + Sync + 'static,
            $($A: Argument + 'static,)*
        {
            type Output = Out;
            type Wrapped = Box<dyn Fn($($A),*) -> Out + Send + Sync>;

            fn signature() -> Signature {
                Signature::new(vec![$(type_name::<$A>()),*], type_name::<Out>())
            }

            #[inline]
            fn invoke(&self, ($($a,)*): ($($A,)*)) -> Out {
                (self)($($a),*)
            }

            #[inline]
            fn arguments(($($a,)*): &($($A,)*)) -> Vec<&dyn Argument> {
                vec![$($a as &dyn Argument),*]
            }

            fn wrap<C>(call: C) -> Self::Wrapped
            where
                C: Fn(($($A,)*)) -> Out + Send + Sync + 'static,
            {
                Box::new(move |$($a),*| call(($($a,)*)))
            }
        }
    };
}

impl_memo_fn!();
impl_memo_fn!(A1 a1);
impl_memo_fn!(A1 a1, A2 a2);
impl_memo_fn!(A1 a1, A2 a2, A3 a3);
impl_memo_fn!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_memo_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_memo_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_memo_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_memo_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// A callable paired with the cache holding its results.
pub struct Memoizer<F, Args>
where
    F: MemoFn<Args>,
{
    func: F,
    cache: Arc<dyn Cache<F::Output>>,
    signature: Signature,
    _args: PhantomData<fn(Args)>,
}

impl<F, Args> Memoizer<F, Args>
where
    F: MemoFn<Args>,
{
    /// Wraps `func` with a default [`MapCache`](crate::store::map::MapCache).
    pub fn new(func: F) -> Self {
        MemoizerBuilder::new().build(func)
    }

    pub(crate) fn from_parts(func: F, cache: Arc<dyn Cache<F::Output>>) -> Self {
        Self {
            func,
            cache,
            signature: F::signature(),
            _args: PhantomData,
        }
    }

    /// Signature captured at wrap time.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Backing cache.
    pub fn cache(&self) -> &Arc<dyn Cache<F::Output>> {
        &self.cache
    }

    /// Calls through the cache, keyed by the actual arguments.
    pub fn call(&self, args: Args) -> F::Output
    where
        Args: Clone,
    {
        if let Some(hit) = self.cache.get(&F::arguments(&args)) {
            trace!(signature = %self.signature, "memo hit");
            return hit;
        }
        trace!(signature = %self.signature, "memo miss");
        let results = self.func.invoke(args.clone());
        self.cache.set(&F::arguments(&args), results.clone());
        results
    }

    /// Calls through the cache, keyed by `key` alone.
    pub fn call_keyed(&self, key: &dyn Argument, args: Args) -> F::Output {
        let key = [key];
        if let Some(hit) = self.cache.get(&key) {
            trace!(signature = %self.signature, "memo hit (manual key)");
            return hit;
        }
        trace!(signature = %self.signature, "memo miss (manual key)");
        let results = self.func.invoke(args);
        self.cache.set(&key, results.clone());
        results
    }

    /// Returns a callable with the original signature, memoized by its
    /// arguments.
    pub fn into_auto(self) -> F::Wrapped
    where
        Args: Clone + 'static,
    {
        let memo = Arc::new(self);
        F::wrap(move |args| memo.call(args))
    }

    /// Returns a function from an explicit key to a callable with the
    /// original signature. Calls through that callable are cached under
    /// the key, never under their actual arguments.
    pub fn into_manual<K>(self) -> impl Fn(K) -> F::Wrapped + Send + Sync
    where
        K: Argument + Send + Sync + 'static,
        Args: 'static,
    {
        let memo = Arc::new(self);
        move |key: K| {
            let memo = Arc::clone(&memo);
            F::wrap(move |args| memo.call_keyed(&key, args))
        }
    }
}

impl<F, Args> fmt::Debug for Memoizer<F, Args>
where
    F: MemoFn<Args>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("signature", &self.signature)
            .field("entries", &self.cache.len())
            .finish()
    }
}

/// Memoizes `func`, keyed by its arguments, using a default cache.
pub fn auto<F, Args>(func: F) -> F::Wrapped
where
    F: MemoFn<Args>,
    Args: Clone + 'static,
{
    Memoizer::new(func).into_auto()
}

/// Memoizes `func`, keyed by its arguments, configured by `options`.
pub fn auto_with<F, Args, I>(func: F, options: I) -> F::Wrapped
where
    F: MemoFn<Args>,
    Args: Clone + 'static,
    I: IntoIterator<Item = MemoOption<F::Output>>,
{
    MemoizerBuilder::from_options(options)
        .build(func)
        .into_auto()
}

/// Memoizes `func` under caller-chosen keys, using a default cache.
///
/// ```rust
/// let lookup = memokit::manual(|id: u32| format!("user-{id}"));
/// assert_eq!(lookup("alice")(1), "user-1");
/// // Same key, different argument: served from the cache.
/// assert_eq!(lookup("alice")(2), "user-1");
/// ```
pub fn manual<K, F, Args>(func: F) -> impl Fn(K) -> F::Wrapped + Send + Sync
where
    K: Argument + Send + Sync + 'static,
    F: MemoFn<Args>,
    Args: 'static,
{
    Memoizer::new(func).into_manual()
}

/// Memoizes `func` under caller-chosen keys, configured by `options`.
pub fn manual_with<K, F, Args, I>(func: F, options: I) -> impl Fn(K) -> F::Wrapped + Send + Sync
where
    K: Argument + Send + Sync + 'static,
    F: MemoFn<Args>,
    Args: 'static,
    I: IntoIterator<Item = MemoOption<F::Output>>,
{
    MemoizerBuilder::from_options(options)
        .build(func)
        .into_manual()
}
