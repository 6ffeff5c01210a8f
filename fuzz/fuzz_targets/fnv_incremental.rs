#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::ds::Fnv64a;

// Fuzz the FNV-1a accumulator with arbitrary chunking
//
// Absorbing the input in any chunking must match absorbing it whole, and
// the Hasher impl must agree with the inherent writes.
fuzz_target!(|data: &[u8]| {
    use std::hash::Hasher;

    let mut whole = Fnv64a::new();
    whole.write_bytes(data);

    let step = data.first().map_or(1, |b| usize::from(*b % 16) + 1);
    let mut chunked = Fnv64a::new();
    for chunk in data.chunks(step) {
        chunked.write_bytes(chunk);
    }
    assert_eq!(whole.sum(), chunked.sum());

    let mut hasher = Fnv64a::new();
    hasher.write(data);
    assert_eq!(hasher.finish(), whole.sum());
});
