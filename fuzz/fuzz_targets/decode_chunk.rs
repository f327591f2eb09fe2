#![no_main]
use libfuzzer_sys::fuzz_target;

use chunkatlas::{decode_chunk, Registry};
use skimnbt::SkipList;

fuzz_target!(|data: &[u8]| {
    let _ = decode_chunk(data, Registry::vanilla(), SkipList::chunk_summary());
});
