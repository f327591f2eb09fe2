#![no_main]
use libfuzzer_sys::fuzz_target;

use skimnbt::{from_bytes, SkipList};

fuzz_target!(|data: &[u8]| {
    let _ = from_bytes(data, SkipList::chunk_summary());
    let _ = from_bytes(data, &SkipList::empty());
});
