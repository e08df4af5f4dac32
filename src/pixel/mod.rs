//! Pixel buffers and the flat-color background classifier.
//!
//! The classifier assumes generated sprite sheets: one uniform background
//! color with emoji drawn on top. It samples the corners to find that color
//! and produces a per-pixel foreground mask.

mod buffer;
mod classifier;
pub mod codec;
mod color;

pub use buffer::PixelBuffer;
pub use classifier::{create_binary_mask, detect_background_color, BinaryMask, OPACITY_THRESHOLD};
pub use color::{color_distance, colors_are_similar, RgbaColor};
