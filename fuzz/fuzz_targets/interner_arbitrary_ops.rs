#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::ds::{Handle, KeyInterner};

// Fuzz arbitrary operation sequences on KeyInterner
//
// Interleaves intern, get_handle and resolve on a table fed by a monotonic
// handle allocator, checking idempotency and resolution.
fuzz_target!(|data: &[u8]| {
    let mut interner: KeyInterner<u32> = KeyInterner::new();
    let mut next = 0u64;
    let mut all_handles: Vec<Handle> = Vec::new();

    for pair in data.chunks_exact(2) {
        let key = u32::from(pair[1]);
        match pair[0] % 3 {
            0 => {
                let handle = interner.intern(&key, || {
                    next += 1;
                    Handle::from_id(next)
                });
                all_handles.push(handle);
                assert_eq!(interner.resolve(handle), Some(&key));

                let again = interner.intern(&key, || unreachable!("key already interned"));
                assert_eq!(again, handle);
            },
            1 => {
                if let Some(handle) = interner.get_handle(&key) {
                    assert_eq!(interner.resolve(handle), Some(&key));
                }
            },
            2 => {
                if !all_handles.is_empty() {
                    let handle = all_handles[usize::from(pair[1]) % all_handles.len()];
                    assert!(interner.resolve(handle).is_some());
                }
            },
            _ => unreachable!(),
        }

        assert_eq!(interner.is_empty(), interner.len() == 0);
        assert_eq!(interner.len() as u64, next);
    }
});
