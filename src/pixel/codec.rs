//! Decode/encode at the system boundary.
//!
//! The segmentation engine itself only sees [`PixelBuffer`]s; these helpers
//! are what the CLI and the extractor use to cross into encoded bytes.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::buffer::PixelBuffer;
use crate::error::EmojiCutError;

/// Decodes any supported encoded image into RGBA pixels.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, EmojiCutError> {
    let img = image::load_from_memory(bytes)?;
    Ok(PixelBuffer::from(img.to_rgba8()))
}

/// Opens and decodes an image file.
pub fn read_image(path: &Path) -> Result<PixelBuffer, EmojiCutError> {
    let img = image::open(path).map_err(|source| EmojiCutError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PixelBuffer::from(img.to_rgba8()))
}

/// Encodes pixels as PNG, keeping the alpha channel.
pub fn encode_png(pixels: &PixelBuffer) -> Result<Vec<u8>, EmojiCutError> {
    let img = DynamicImage::ImageRgba8(pixels.clone().into());
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Downscales so the longer side is at most `max_side`; never upscales.
pub fn thumbnail(pixels: &PixelBuffer, max_side: u32) -> PixelBuffer {
    let longest = pixels.width().max(pixels.height());
    if longest <= max_side || pixels.is_empty() {
        return pixels.clone();
    }
    let scale = max_side as f64 / longest as f64;
    let w = ((pixels.width() as f64 * scale).round() as u32).max(1);
    let h = ((pixels.height() as f64 * scale).round() as u32).max(1);
    let img: image::RgbaImage = pixels.clone().into();
    PixelBuffer::from(image::imageops::resize(&img, w, h, FilterType::Triangle))
}
