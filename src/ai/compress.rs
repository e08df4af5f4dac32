//! Shrinking uploads to fit the vision API's size cap.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;

use crate::error::EmojiCutError;

/// JPEG qualities tried at each size step, best first.
const QUALITY_STEPS: [u8; 5] = [85, 70, 55, 40, 25];

/// Each size step keeps this fraction of the previous dimensions.
const SCALE_STEP: f64 = 0.8;

/// Returns `blob` unchanged if it already fits, otherwise a JPEG re-encode
/// no larger than `max_size`.
///
/// Quality is lowered first, then the dimensions shrink by 20% per step
/// until a fit is found. Transparency is flattened since JPEG has no alpha.
///
/// # Errors
/// Fails if `blob` cannot be decoded, or if even a 1x1 encode is larger
/// than `max_size`.
pub fn compress_image(blob: &[u8], max_size: usize) -> Result<Vec<u8>, EmojiCutError> {
    if blob.len() <= max_size {
        return Ok(blob.to_vec());
    }

    let source = image::load_from_memory(blob)?.to_rgb8();
    let (orig_w, orig_h) = source.dimensions();
    let mut scale = 1.0_f64;
    let mut smallest = usize::MAX;

    loop {
        let w = ((f64::from(orig_w) * scale).round() as u32).max(1);
        let h = ((f64::from(orig_h) * scale).round() as u32).max(1);
        let frame = if (w, h) == (orig_w, orig_h) {
            source.clone()
        } else {
            image::imageops::resize(&source, w, h, FilterType::Triangle)
        };

        for quality in QUALITY_STEPS {
            let encoded = encode_jpeg(&frame, quality)?;
            log::debug!(
                "compress {}x{} q{} -> {} bytes (limit {})",
                w,
                h,
                quality,
                encoded.len(),
                max_size
            );
            if encoded.len() <= max_size {
                return Ok(encoded);
            }
            smallest = smallest.min(encoded.len());
        }

        if w == 1 && h == 1 {
            return Err(EmojiCutError::CompressionFailed { max_size, smallest });
        }
        scale *= SCALE_STEP;
    }
}

fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, EmojiCutError> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(frame)?;
    Ok(out.into_inner())
}
