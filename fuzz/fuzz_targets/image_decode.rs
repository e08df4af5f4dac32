//! Fuzz target for decoding sheets and running the classic splitter.
//!
//! Run with:
//!   cargo +nightly fuzz run image_decode

#![no_main]

use emojicut::config::ManualSplitConfig;
use emojicut::pixel::codec;
use emojicut::segment::detect_emojis;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    // skip headers that promise huge images
    if let Ok(size) = imagesize::blob_size(data) {
        if size.width.saturating_mul(size.height) > 512 * 512 {
            return;
        }
    }
    if let Ok(pixels) = codec::decode(data) {
        let _ = detect_emojis(&pixels, &ManualSplitConfig::default());
    }
});
