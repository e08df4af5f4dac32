//! Cutting regions out of the source image.
//!
//! Each region is cropped (rectangle or polygon mask), optionally run
//! through background removal, then encoded as a PNG together with a small
//! preview. Batch extraction is best-effort: a region that fails is logged
//! and skipped, and the others are still produced.

mod cache;
mod crop;

pub use cache::{EvictionPolicy, Lru, ThumbnailCache, ThumbnailKey, Unbounded};
pub use crop::{extract_polygon, extract_rectangle, CropWindow};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::background::{remove_background_simple, RemovalOptions};
use crate::error::EmojiCutError;
use crate::geometry::BoundingBox;
use crate::pixel::{codec, PixelBuffer};
use crate::segment::{RegionId, RegionKind, SegmentationRegion};
use crate::selection::SelectionRegion;

/// Longest side of an [`ExtractedEmoji::preview`].
pub const PREVIEW_MAX_SIDE: u32 = 128;

/// How regions are cut out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Extra pixels around the box on every side (clipped to the image).
    pub padding: u32,
    pub remove_background: bool,
    pub tolerance: f64,
    pub feather: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            padding: 0,
            remove_background: true,
            tolerance: 30.0,
            feather: true,
        }
    }
}

impl ExtractOptions {
    /// Hash of every setting that changes the rendered pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.padding.hash(&mut hasher);
        self.remove_background.hash(&mut hasher);
        self.tolerance.to_bits().hash(&mut hasher);
        self.feather.hash(&mut hasher);
        hasher.finish()
    }

    fn removal_options(&self) -> RemovalOptions {
        RemovalOptions {
            tolerance: self.tolerance,
            feather: self.feather,
            ..RemovalOptions::default()
        }
    }
}

/// A finished cutout.
#[derive(Clone, Debug)]
pub struct ExtractedEmoji {
    pub id: RegionId,
    /// PNG-encoded pixels, alpha included.
    pub blob: Vec<u8>,
    pub preview: PixelBuffer,
    /// Where the cutout came from in the source image.
    pub bounding_box: BoundingBox,
}

impl ExtractedEmoji {
    /// Encodes `pixels` and renders the preview.
    pub fn encode(
        id: RegionId,
        pixels: &PixelBuffer,
        bounding_box: BoundingBox,
    ) -> Result<Self, EmojiCutError> {
        Ok(Self {
            id,
            blob: codec::encode_png(pixels)?,
            preview: codec::thumbnail(pixels, PREVIEW_MAX_SIDE),
            bounding_box,
        })
    }
}

/// Crops one region and, if enabled, removes its background.
///
/// Background removal is best-effort: if it fails, the crop is returned
/// as cut.
pub fn extract_from_selection_region(
    pixels: &PixelBuffer,
    region: &SelectionRegion,
    options: &ExtractOptions,
) -> Result<PixelBuffer, EmojiCutError> {
    let crop = match (region.kind, &region.polygon) {
        (RegionKind::Polygon, Some(polygon)) => {
            extract_polygon(pixels, polygon, &region.bounding_box, options.padding)?
        }
        _ => extract_rectangle(pixels, &region.bounding_box, options.padding)?,
    };

    if !options.remove_background {
        return Ok(crop);
    }
    match remove_background_simple(&crop, &options.removal_options()) {
        Ok(cleaned) => Ok(cleaned),
        Err(err) => {
            log::warn!("keeping region {} unmasked: {}", region.id, err);
            Ok(crop)
        }
    }
}

/// Extracts every region, skipping (and logging) the ones that fail.
pub fn extract_emojis(
    pixels: &PixelBuffer,
    regions: &[SelectionRegion],
    options: &ExtractOptions,
) -> Vec<ExtractedEmoji> {
    let mut out = Vec::with_capacity(regions.len());
    for region in regions {
        let result = extract_from_selection_region(pixels, region, options)
            .and_then(|cut| ExtractedEmoji::encode(region.id, &cut, region.bounding_box));
        match result {
            Ok(emoji) => out.push(emoji),
            Err(err) => log::warn!("skipping region {}: {}", region.id, err),
        }
    }
    log::info!("extracted {} of {} regions", out.len(), regions.len());
    out
}

/// Extracts detected regions directly, without user editing.
pub fn extract_segmentation_regions(
    pixels: &PixelBuffer,
    regions: &[SegmentationRegion],
    options: &ExtractOptions,
) -> Vec<ExtractedEmoji> {
    let selections: Vec<SelectionRegion> = regions.iter().map(SelectionRegion::from).collect();
    extract_emojis(pixels, &selections, options)
}

/// Preview for a region, served from `cache` while neither its geometry
/// nor `options` have changed.
pub fn region_preview<P: EvictionPolicy>(
    cache: &mut ThumbnailCache<P>,
    pixels: &PixelBuffer,
    region: &SelectionRegion,
    options: &ExtractOptions,
) -> Result<PixelBuffer, EmojiCutError> {
    cache.get_or_render(region, options.fingerprint(), || {
        let cut = extract_from_selection_region(pixels, region, options)?;
        Ok(codec::thumbnail(&cut, PREVIEW_MAX_SIDE))
    })
}
