//! Box filtering and proximity merging.

use crate::geometry::BoundingBox;

/// Drops boxes that are too small in area or along their shorter side.
pub fn filter_boxes(boxes: Vec<BoundingBox>, min_area: f64, min_size: f64) -> Vec<BoundingBox> {
    boxes
        .into_iter()
        .filter(|b| b.area() >= min_area && b.width.min(b.height) >= min_size)
        .collect()
}

/// Unions boxes whose edge-to-edge gap is within `max_gap` on both axes.
///
/// Runs to a fixed point so chains of near-adjacent boxes collapse fully,
/// even when a union only comes into range after an earlier merge.
pub fn merge_nearby(mut boxes: Vec<BoundingBox>, max_gap: f64) -> Vec<BoundingBox> {
    loop {
        let mut merged_any = false;
        let mut i = 0;
        while i < boxes.len() {
            let mut j = i + 1;
            while j < boxes.len() {
                let (dx, dy) = boxes[i].gap_to(&boxes[j]);
                if dx <= max_gap && dy <= max_gap {
                    let other = boxes.swap_remove(j);
                    boxes[i] = boxes[i].union(&other);
                    merged_any = true;
                    // boxes[i] grew, recheck everything after it
                    j = i + 1;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged_any {
            return boxes;
        }
    }
}

/// Merge distance in pixels for a given image size.
pub fn merge_threshold(merge_distance_percent: f64, width: u32, height: u32) -> f64 {
    merge_distance_percent / 100.0 * width.min(height) as f64
}
