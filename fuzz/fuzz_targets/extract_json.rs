//! Fuzz target for locating JSON inside free-form model output.
//!
//! Run with:
//!   cargo +nightly fuzz run extract_json

#![no_main]

use emojicut::ai::{extract_json_from_text, fuzz_balanced_object};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 256 * 1024 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = extract_json_from_text(text);
    if let Some(object) = fuzz_balanced_object(text) {
        assert!(object.starts_with('{') && object.ends_with('}'));
    }
});
