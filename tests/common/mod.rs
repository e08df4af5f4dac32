#![allow(dead_code)]

use std::fs;
use std::path::Path;

use emojicut::pixel::{codec, PixelBuffer, RgbaColor};

/// A filled axis-aligned square on a sheet.
pub struct Square {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub color: RgbaColor,
}

impl Square {
    pub fn new(x: u32, y: u32, size: u32, color: RgbaColor) -> Self {
        Self { x, y, size, color }
    }
}

pub fn sheet(width: u32, height: u32, squares: &[Square]) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(width, height, RgbaColor::WHITE);
    for sq in squares {
        for y in sq.y..sq.y + sq.size {
            for x in sq.x..sq.x + sq.size {
                buf.set(x, y, sq.color);
            }
        }
    }
    buf
}

/// 1000x1000 white sheet with a red and a blue 100px square far apart.
pub fn two_square_sheet() -> PixelBuffer {
    sheet(
        1000,
        1000,
        &[
            Square::new(100, 150, 100, RgbaColor::rgb(220, 40, 40)),
            Square::new(700, 600, 100, RgbaColor::rgb(40, 40, 220)),
        ],
    )
}

pub fn png_bytes(pixels: &PixelBuffer) -> Vec<u8> {
    codec::encode_png(pixels).expect("encode png")
}

pub fn write_png(path: &Path, pixels: &PixelBuffer) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, png_bytes(pixels)).expect("write png file");
}
