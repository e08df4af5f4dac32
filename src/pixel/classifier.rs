//! Background color detection and foreground masking.

use super::buffer::PixelBuffer;
use super::color::{colors_are_similar, RgbaColor};

/// Pixels with alpha below this are treated as background.
pub const OPACITY_THRESHOLD: u8 = 128;

/// Upper bound on how far corner samples are inset from the edge.
const MAX_CORNER_INSET: u32 = 5;

/// Estimates the background color from the four (inset) corners.
///
/// Samples are grouped by similarity to each group's first member; the
/// largest group wins and ties keep the group found first. An image with no
/// pixels yields opaque white.
pub fn detect_background_color(pixels: &PixelBuffer, tolerance: f64) -> RgbaColor {
    let samples = corner_samples(pixels);

    let mut groups: Vec<(RgbaColor, usize)> = Vec::new();
    for sample in samples {
        match groups
            .iter_mut()
            .find(|(representative, _)| colors_are_similar(*representative, sample, tolerance))
        {
            Some((_, count)) => *count += 1,
            None => groups.push((sample, 1)),
        }
    }

    let mut best: Option<(RgbaColor, usize)> = None;
    for (color, count) in groups {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((color, count));
        }
    }
    best.map(|(color, _)| color).unwrap_or(RgbaColor::WHITE)
}

fn corner_samples(pixels: &PixelBuffer) -> Vec<RgbaColor> {
    if pixels.is_empty() {
        return Vec::new();
    }
    let (w, h) = (pixels.width(), pixels.height());
    let inset = MAX_CORNER_INSET.min(w.min(h) / 10);
    let (left, top) = (inset, inset);
    let right = w - 1 - inset;
    let bottom = h - 1 - inset;

    vec![
        pixels.get(left, top),
        pixels.get(right, top),
        pixels.get(left, bottom),
        pixels.get(right, bottom),
    ]
}

/// One boolean per pixel, `true` meaning foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn is_foreground(&self, index: usize) -> bool {
        self.bits[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, foreground: bool) {
        self.bits[index] = foreground;
    }

    pub fn foreground_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Marks every opaque pixel that is not similar to `background` as foreground.
pub fn create_binary_mask(
    pixels: &PixelBuffer,
    background: RgbaColor,
    tolerance: f64,
) -> BinaryMask {
    let mut mask = BinaryMask::new(pixels.width(), pixels.height());
    for index in 0..pixels.pixel_count() {
        let color = pixels.color_at_index(index);
        let foreground =
            color.a >= OPACITY_THRESHOLD && !colors_are_similar(color, background, tolerance);
        mask.set(index, foreground);
    }
    mask
}
