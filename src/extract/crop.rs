//! Rectangle and polygon crops.

use crate::error::EmojiCutError;
use crate::geometry::{point_in_polygon, BoundingBox, Point, Polygon};
use crate::pixel::PixelBuffer;

/// Integer pixel window covering `bbox` grown by `padding`, clipped to the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    /// Covers every pixel the box touches, then pads and clips.
    ///
    /// # Errors
    /// [`EmojiCutError::DegenerateRegion`] if nothing of the window is left
    /// inside the image.
    pub fn around(
        bbox: &BoundingBox,
        padding: u32,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, EmojiCutError> {
        let pad = f64::from(padding);
        let x0 = (bbox.x - pad).floor().max(0.0);
        let y0 = (bbox.y - pad).floor().max(0.0);
        let x1 = (bbox.right() + pad).ceil().min(f64::from(image_width));
        let y1 = (bbox.bottom() + pad).ceil().min(f64::from(image_height));

        if !(x1 > x0 && y1 > y0) {
            return Err(EmojiCutError::DegenerateRegion {
                width: (x1 - x0).max(0.0),
                height: (y1 - y0).max(0.0),
            });
        }
        Ok(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Straight copy of the padded box, no masking.
pub fn extract_rectangle(
    pixels: &PixelBuffer,
    bbox: &BoundingBox,
    padding: u32,
) -> Result<PixelBuffer, EmojiCutError> {
    let window = CropWindow::around(bbox, padding, pixels.width(), pixels.height())?;
    Ok(pixels.crop(window.x, window.y, window.width, window.height))
}

/// Same window as [`extract_rectangle`], keeping only pixels whose centre
/// lies inside `polygon`; the rest become fully transparent.
pub fn extract_polygon(
    pixels: &PixelBuffer,
    polygon: &Polygon,
    bbox: &BoundingBox,
    padding: u32,
) -> Result<PixelBuffer, EmojiCutError> {
    if polygon.len() < 3 {
        return Err(EmojiCutError::InvalidPolygon {
            message: format!("need at least 3 vertices, got {}", polygon.len()),
        });
    }
    let window = CropWindow::around(bbox, padding, pixels.width(), pixels.height())?;
    let mut crop = pixels.crop(window.x, window.y, window.width, window.height);
    let local = polygon.translated(-f64::from(window.x), -f64::from(window.y));

    for cy in 0..window.height {
        for cx in 0..window.width {
            let centre = Point::new(f64::from(cx) + 0.5, f64::from(cy) + 0.5);
            if !point_in_polygon(centre, &local) {
                let index = crop.index_of(cx, cy);
                crop.set_alpha_at_index(index, 0);
            }
        }
    }
    Ok(crop)
}
