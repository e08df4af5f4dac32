//! Fuzz target for vision-model answer parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run ai_response_parse

#![no_main]

use emojicut::ai::{parse_response_with, CoordinateUnit};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 || data.len() > 1024 * 1024 {
        return;
    }
    // first bytes pick the image size and unit, the rest is the answer
    let width = u32::from(u16::from_le_bytes([data[0], data[1]])) + 1;
    let height = u32::from(data[2]) + 1;
    let unit = if data[3] & 1 == 1 {
        CoordinateUnit::Percent
    } else {
        CoordinateUnit::Pixels
    };
    let Ok(text) = std::str::from_utf8(&data[4..]) else {
        return;
    };

    if let Ok(regions) = parse_response_with(text, width, height, unit) {
        for region in regions {
            let b = region.bounding_box;
            assert!(b.x >= 0.0 && b.y >= 0.0);
            assert!(b.right() <= f64::from(width) && b.bottom() <= f64::from(height));
        }
    }
});
