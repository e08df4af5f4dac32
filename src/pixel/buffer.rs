//! Row-major RGBA pixel buffers.

use super::color::RgbaColor;
use crate::error::EmojiCutError;

/// A decoded image: `width * height` pixels, 4 bytes each, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes, checking the length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EmojiCutError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EmojiCutError::PixelBufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with a single color.
    pub fn filled(width: u32, height: u32, color: RgbaColor) -> Self {
        let data = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            data,
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
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Color at flat pixel index `y * width + x`.
    #[inline]
    pub fn color_at_index(&self, index: usize) -> RgbaColor {
        let i = index * 4;
        RgbaColor::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Color at `(x, y)`. Panics if out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> RgbaColor {
        self.color_at_index(self.index_of(x, y))
    }

    /// Overwrites the pixel at `(x, y)`. Panics if out of bounds.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: RgbaColor) {
        let i = self.index_of(x, y) * 4;
        self.data[i..i + 4].copy_from_slice(&color.to_array());
    }

    #[inline]
    pub fn alpha_at_index(&self, index: usize) -> u8 {
        self.data[index * 4 + 3]
    }

    #[inline]
    pub fn set_alpha_at_index(&mut self, index: usize, alpha: u8) {
        self.data[index * 4 + 3] = alpha;
    }

    #[inline]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Copies the `width x height` window whose top-left corner is `(x, y)`.
    ///
    /// The window must lie inside the buffer.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for row in y..y + height {
            let start = self.index_of(x, row) * 4;
            data.extend_from_slice(&self.data[start..start + width as usize * 4]);
        }
        PixelBuffer {
            width,
            height,
            data,
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<PixelBuffer> for image::RgbaImage {
    fn from(buffer: PixelBuffer) -> Self {
        // length is checked on construction, so from_raw cannot fail
        image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.data)
            .unwrap_or_else(|| image::RgbaImage::new(0, 0))
    }
}
