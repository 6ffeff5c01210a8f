//! Key derivation benchmarks.
//!
//! Run with: `cargo bench --bench keyer`

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use memokit::ds::Fnv64a;
use memokit::keyer::{Fnv64aKeyer, Keyer};
use memokit::{Argument, Interned, Serialized};
use serde::Serialize;

#[derive(Serialize, Clone, PartialEq, Eq, Hash)]
struct Request {
    path: String,
    page: u32,
    tags: Vec<String>,
}

fn request() -> Request {
    Request {
        path: "/api/items".to_string(),
        page: 3,
        tags: vec!["new".to_string(), "sale".to_string()],
    }
}

fn bench_fnv(c: &mut Criterion) {
    let mut group = c.benchmark_group("fnv64a");
    for len in [8usize, 64, 1024] {
        let data = vec![0xA5u8; len];
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("{len}b"), |b| {
            b.iter(|| {
                let mut h = Fnv64a::new();
                h.write_bytes(black_box(&data));
                black_box(h.sum())
            })
        });
    }
    group.finish();
}

fn bench_keyer(c: &mut Criterion) {
    let keyer = Fnv64aKeyer::new();
    let mut group = c.benchmark_group("fnv64a_keyer");

    group.bench_function("scalars", |b| {
        b.iter(|| {
            let args: [&dyn Argument; 3] = [&black_box(42i64), &black_box(1.5f64), &true];
            black_box(keyer.key(&args))
        })
    });

    group.bench_function("string", |b| {
        let s = "the quick brown fox jumps over the lazy dog".to_string();
        b.iter(|| black_box(keyer.key(&[black_box(&s)])))
    });

    group.bench_function("serialized", |b| {
        let req = Serialized(request());
        b.iter(|| black_box(keyer.key(&[black_box(&req)])))
    });

    group.bench_function("interned", |b| {
        let req = Interned(request());
        keyer.key(&[&req]);
        b.iter(|| black_box(keyer.key(&[black_box(&req)])))
    });

    group.finish();
}

criterion_group!(benches, bench_fnv, bench_keyer);
criterion_main!(benches);
