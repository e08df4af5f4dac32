//! Fuzz target for region document parsing and validation.
//!
//! Run with:
//!   cargo +nightly fuzz run regions_json_parse

#![no_main]

use emojicut::segment::io_json::from_regions_slice;
use emojicut::validation::{validate_regions, ValidateOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 10MB is generous for a region document.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    if let Ok(document) = from_regions_slice(data) {
        let _ = validate_regions(&document, &ValidateOptions::default());
    }
});
