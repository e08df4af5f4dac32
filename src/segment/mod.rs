//! Classic emoji detection on flat backgrounds.
//!
//! The pipeline is: detect background color → foreground mask → 4-connected
//! components → tight boxes → size filter → fixed-point proximity merge.
//! It never fails; a busy background just yields more or fewer regions,
//! which is a quality problem for the user to judge, not an error.
//!
//! # Example
//!
//! ```
//! use emojicut::config::ManualSplitConfig;
//! use emojicut::pixel::{PixelBuffer, RgbaColor};
//! use emojicut::segment::detect_emojis;
//!
//! let mut sheet = PixelBuffer::filled(200, 200, RgbaColor::WHITE);
//! for y in 50..90 {
//!     for x in 50..90 {
//!         sheet.set(x, y, RgbaColor::rgb(240, 180, 0));
//!     }
//! }
//! let regions = detect_emojis(&sheet, &ManualSplitConfig::default());
//! assert_eq!(regions.len(), 1);
//! ```

mod ids;
pub mod io_json;
mod labeler;
mod merge;
mod model;

pub use ids::RegionId;
pub use labeler::{extract_bounding_boxes, label_connected_regions, ComponentLabels};
pub use merge::{filter_boxes, merge_nearby, merge_threshold};
pub use model::{RegionKind, SegmentationMethod, SegmentationRegion, SegmentationResult};

use crate::config::ManualSplitConfig;
use crate::pixel::{create_binary_mask, detect_background_color, PixelBuffer};

/// Runs the classic pipeline and returns rectangle regions in reading order.
pub fn detect_emojis(pixels: &PixelBuffer, config: &ManualSplitConfig) -> Vec<SegmentationRegion> {
    let background = detect_background_color(pixels, config.tolerance);
    let mask = create_binary_mask(pixels, background, config.tolerance);
    let labels = label_connected_regions(&mask);
    let boxes = extract_bounding_boxes(&labels);
    let component_count = boxes.len();

    let boxes = filter_boxes(boxes, config.min_area, config.min_size);
    let kept = boxes.len();
    let threshold = merge_threshold(config.merge_distance_percent, pixels.width(), pixels.height());
    let mut boxes = merge_nearby(boxes, threshold);

    boxes.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    log::debug!(
        "background {:?}: {} components, {} after filtering, {} after merging (gap <= {:.1}px)",
        background,
        component_count,
        kept,
        boxes.len(),
        threshold
    );

    boxes
        .into_iter()
        .enumerate()
        .filter_map(|(i, bbox)| SegmentationRegion::rectangle(i as u64 + 1, bbox))
        .collect()
}

/// Wraps [`detect_emojis`] in a result envelope reporting the fallback method.
pub fn detect_emojis_result(
    pixels: &PixelBuffer,
    config: &ManualSplitConfig,
) -> SegmentationResult {
    SegmentationResult::succeeded(detect_emojis(pixels, config), SegmentationMethod::Fallback)
}
