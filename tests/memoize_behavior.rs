// ==============================================
// MEMOIZATION BEHAVIOR TESTS (integration)
// ==============================================
//
// End-to-end checks of the automatic and manual wrappers: how often the
// wrapped callable runs, what ends up in the cache, and how options apply.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use memokit::prelude::*;
use memokit::Memoizer;

fn call_counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&calls), calls)
}

// ==============================================
// Automatic mode
// ==============================================

mod automatic {
    use super::*;

    #[test]
    fn repeated_arguments_execute_once() {
        let total = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&total);
        let add = auto(move |x: i64| {
            counter.fetch_add(x, Ordering::SeqCst);
        });

        add(100);
        add(1);
        add(1);
        assert_eq!(total.load(Ordering::SeqCst), 101);
    }

    #[test]
    fn no_argument_callable_executes_once() {
        let (calls, seen) = call_counter();
        let answer = auto(move || {
            seen.fetch_add(1, Ordering::SeqCst);
            42
        });
        for _ in 0..5 {
            assert_eq!(answer(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn string_arguments_key_by_content() {
        let (calls, seen) = call_counter();
        let shout = auto(move |s: String| {
            seen.fetch_add(1, Ordering::SeqCst);
            s.to_uppercase()
        });
        assert_eq!(shout("abc".to_string()), "ABC");
        assert_eq!(shout(String::from("abc")), "ABC");
        assert_eq!(shout("xyz".to_string()), "XYZ");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn mixed_argument_kinds() {
        let (calls, seen) = call_counter();
        let describe = auto(move |n: u32, x: f64, flag: bool, label: &'static str| {
            seen.fetch_add(1, Ordering::SeqCst);
            format!("{label}:{n}:{x}:{flag}")
        });
        assert_eq!(describe(1, 0.5, true, "a"), "a:1:0.5:true");
        assert_eq!(describe(1, 0.5, true, "a"), "a:1:0.5:true");
        assert_eq!(describe(1, 0.5, false, "a"), "a:1:0.5:false");
        assert_eq!(describe(1, 0.25, true, "a"), "a:1:0.25:true");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn shared_pointers_key_by_identity() {
        let (calls, seen) = call_counter();
        let len = auto(move |v: Arc<Vec<u8>>| {
            seen.fetch_add(1, Ordering::SeqCst);
            v.len()
        });
        let a = Arc::new(vec![1, 2, 3]);
        let b = Arc::new(vec![1, 2, 3]);
        assert_eq!(len(Arc::clone(&a)), 3);
        assert_eq!(len(Arc::clone(&a)), 3);
        assert_eq!(len(b), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn interned_arguments_key_by_value() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        struct Point {
            x: i32,
            y: i32,
        }

        let (calls, seen) = call_counter();
        let norm = auto(move |p: Interned<Point>| {
            seen.fetch_add(1, Ordering::SeqCst);
            p.0.x.abs() + p.0.y.abs()
        });
        assert_eq!(norm(Interned(Point { x: 1, y: -2 })), 3);
        assert_eq!(norm(Interned(Point { x: 1, y: -2 })), 3);
        assert_eq!(norm(Interned(Point { x: 2, y: -2 })), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn opaque_arguments_share_an_entry() {
        let (calls, seen) = call_counter();
        let first = auto(move |_cb: Opaque<fn() -> u8>, n: u8| {
            seen.fetch_add(1, Ordering::SeqCst);
            n
        });
        assert_eq!(first(Opaque(|| 1), 7), 7);
        assert_eq!(first(Opaque(|| 2), 7), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn vec_arguments_key_by_content() {
        let (calls, seen) = call_counter();
        let total = auto(move |v: Vec<i32>| {
            seen.fetch_add(1, Ordering::SeqCst);
            v.iter().sum::<i32>()
        });
        assert_eq!(total(vec![1, 2]), 3);
        assert_eq!(total(vec![1, 2]), 3);
        assert_eq!(total(vec![2, 1]), 3);
        assert_eq!(total(Vec::new()), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn option_arguments_key_by_content() {
        let (calls, seen) = call_counter();
        let or_zero = auto(move |v: Option<u32>| {
            seen.fetch_add(1, Ordering::SeqCst);
            v.unwrap_or(0)
        });
        assert_eq!(or_zero(Some(4)), 4);
        assert_eq!(or_zero(Some(4)), 4);
        assert_eq!(or_zero(None), 0);
        assert_eq!(or_zero(Some(0)), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn map_arguments_key_by_entries() {
        let (calls, seen) = call_counter();
        let count = auto(move |m: HashMap<String, i32>| {
            seen.fetch_add(1, Ordering::SeqCst);
            m.len()
        });
        let a: HashMap<String, i32> = HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);
        let b: HashMap<String, i32> = HashMap::from([("b".to_string(), 2), ("a".to_string(), 1)]);
        assert_eq!(count(a), 2);
        assert_eq!(count(b), 2);
        assert_eq!(count(HashMap::from([("a".to_string(), 1)])), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tuple_and_wide_integer_arguments() {
        let (calls, seen) = call_counter();
        let scale = auto(move |pair: (u8, &'static str), factor: i128| {
            seen.fetch_add(1, Ordering::SeqCst);
            i128::from(pair.0) * factor
        });
        assert_eq!(scale((2, "x"), 1 << 80), 2 << 80);
        assert_eq!(scale((2, "x"), 1 << 80), 2 << 80);
        assert_eq!(scale((2, "y"), 1 << 80), 2 << 80);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn error_results_are_cached() {
        let (calls, seen) = call_counter();
        let parse = auto(move |s: &'static str| {
            seen.fetch_add(1, Ordering::SeqCst);
            s.parse::<i32>().map_err(|e| e.to_string())
        });
        assert!(parse("nope").is_err());
        assert!(parse("nope").is_err());
        assert_eq!(parse("12"), Ok(12));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panics_propagate_and_store_nothing() {
        let (calls, seen) = call_counter();
        let memo = Memoizer::new(move |n: u8| {
            seen.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                panic!("zero");
            }
            n
        });

        let outcome = catch_unwind(AssertUnwindSafe(|| memo.call((0,))));
        assert!(outcome.is_err());
        assert!(memo.cache().is_empty());

        let outcome = catch_unwind(AssertUnwindSafe(|| memo.call((0,))));
        assert!(outcome.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(memo.call((3,)), 3);
        assert_eq!(memo.cache().len(), 1);
    }

    #[test]
    fn wrapped_callable_is_shareable_across_threads() {
        let (calls, seen) = call_counter();
        let square = Arc::new(auto(move |n: u64| {
            seen.fetch_add(1, Ordering::SeqCst);
            n * n
        }));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let square = Arc::clone(&square);
                thread::spawn(move || (0..50u64).map(|n| square(n)).sum::<u64>())
            })
            .collect();
        let expected: u64 = (0..50u64).map(|n| n * n).sum();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        // Racing misses may each compute, but never more than once per thread.
        let n = calls.load(Ordering::SeqCst);
        assert!((50..=200).contains(&n));
    }
}

// ==============================================
// Manual mode
// ==============================================

mod manual_mode {
    use super::*;

    #[test]
    fn key_overrides_arguments() {
        let (calls, seen) = call_counter();
        let fetch = manual(move |id: u32| {
            seen.fetch_add(1, Ordering::SeqCst);
            format!("row-{id}")
        });

        assert_eq!(fetch("page-1")(1), "row-1");
        assert_eq!(fetch("page-1")(2), "row-1");
        assert_eq!(fetch("page-2")(2), "row-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn same_key_bound_once_serves_many_calls() {
        let (calls, seen) = call_counter();
        let build = manual(move |a: i32, b: i32| {
            seen.fetch_add(1, Ordering::SeqCst);
            a + b
        });
        let bound = build(7u64);
        assert_eq!(bound(1, 2), 3);
        assert_eq!(bound(10, 20), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn manual_with_uses_injected_cache() {
        let cache = MapCache::new();
        let fetch = manual_with(|x: u8| x, [MemoOption::cache(cache.clone())]);
        fetch("k")(5);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&[&"k"]), Some(5));
    }
}

// ==============================================
// Options
// ==============================================

mod options {
    use super::*;

    #[test]
    fn custom_cache_receives_results() {
        let cache = MapCache::new();
        let double = auto_with(|x: i32| x * 2, [MemoOption::cache(cache.clone())]);
        double(1);
        double(2);
        double(2);
        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 2);
        assert_eq!(cache.len(), 2);

        // A direct lookup is a hit of its own.
        assert_eq!(cache.get(&[&2]), Some(4));
        assert_eq!(cache.metrics().hits, 2);
    }

    #[test]
    fn flush_interval_clears_results() {
        let scope = CancellationScope::new();
        let cache = MapCache::new();
        let (calls, seen) = call_counter();
        let id = auto_with(
            move |x: u8| {
                seen.fetch_add(1, Ordering::SeqCst);
                x
            },
            [
                MemoOption::cache(cache.clone()),
                MemoOption::flush_interval(Duration::from_millis(5), &scope),
            ],
        );

        id(1);
        let start = Instant::now();
        while !cache.is_empty() && start.elapsed() < Duration::from_secs(2) {
            thread::sleep(Duration::from_millis(2));
        }
        assert!(cache.is_empty());
        id(1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        scope.cancel();
    }

    #[test]
    fn cancelled_scope_stops_flushing() {
        let scope = CancellationScope::new();
        let cache = MapCache::new();
        let id = auto_with(
            |x: u8| x,
            [
                MemoOption::cache(cache.clone()),
                MemoOption::flush_interval(Duration::from_millis(5), &scope),
            ],
        );
        scope.cancel();
        // Give an in-flight tick time to finish.
        thread::sleep(Duration::from_millis(30));

        id(1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn builder_rejects_zero_interval() {
        let scope = CancellationScope::new();
        let result = MemoizerBuilder::new()
            .flush_interval(Duration::ZERO, &scope)
            .try_build(|x: u8| x);
        assert!(result.is_err());
    }
}
