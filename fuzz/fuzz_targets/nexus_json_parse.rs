//! Fuzz target for loading NeXus trees from JSON dumps.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nxmeta::nexus::io_json::from_json_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_json_slice(data);
});
