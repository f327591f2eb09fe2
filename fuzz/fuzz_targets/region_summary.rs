#![no_main]
use libfuzzer_sys::fuzz_target;

use chunkatlas::{Region, RegionSummary, Registry};
use skimnbt::SkipList;
use std::io::Cursor;

fuzz_target!(|data: Vec<u8>| {
    if let Ok(mut region) = Region::from_stream(Cursor::new(data)) {
        let _ = RegionSummary::decode(
            &mut region,
            0,
            0,
            Registry::vanilla(),
            SkipList::chunk_summary(),
        );
    }
});
