#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::keyer::{Fnv64aKeyer, Keyer};
use memokit::Argument;

// Fuzz key derivation over arbitrary byte strings split into arguments
//
// Equal argument lists must agree, borrowed or owned.
fuzz_target!(|data: &[u8]| {
    let keyer = Fnv64aKeyer::new();
    let text = String::from_utf8_lossy(data).into_owned();

    let whole: [&dyn Argument; 1] = [&text];
    let copy = text.clone();
    assert_eq!(keyer.key(&whole), keyer.key(&[&copy]));

    if let Some((mid, _)) = text.char_indices().nth(1) {
        let (left, right) = text.split_at(mid);
        let split: [&dyn Argument; 2] = [&left, &right];
        assert_eq!(keyer.key(&split), keyer.key(&[&left.to_string(), &right.to_string()]));
    }

    let numbers: Vec<u64> = data
        .chunks(8)
        .map(|c| c.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
        .collect();
    let args: Vec<&dyn Argument> = numbers.iter().map(|n| n as &dyn Argument).collect();
    assert_eq!(keyer.key(&args), keyer.key(&args));
});
