#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use memokit::{Cache, MapCache};

// Fuzz arbitrary set/get/clear sequences on MapCache
//
// Mirrors every operation in a HashMap model keyed by the same arguments
// and checks that lookups agree.
fuzz_target!(|data: &[u8]| {
    let cache: MapCache<u8> = MapCache::new();
    let mut model: HashMap<(u8, bool), u8> = HashMap::new();

    for op in data.chunks_exact(3) {
        let key = (op[1], op[1] % 2 == 0);
        match op[0] % 4 {
            0 | 1 => {
                cache.set(&[&key.0, &key.1], op[2]);
                model.insert(key, op[2]);
            },
            2 => {
                assert_eq!(cache.get(&[&key.0, &key.1]), model.get(&key).copied());
            },
            3 => {
                cache.clear();
                model.clear();
            },
            _ => unreachable!(),
        }
        assert_eq!(cache.len(), model.len());
    }
});
