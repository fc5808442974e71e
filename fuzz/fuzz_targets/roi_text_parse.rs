//! Fuzz target for the Excalibur ROI blob repair and parser.
//!
//! The blob is rewritten by blind substring replacement before parsing, so
//! arbitrary input must never panic on the way to a JSON error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nxmeta::beamline::i07::parse_roi_text;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_roi_text(text);
    }
});
