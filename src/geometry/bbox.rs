//! Axis-aligned bounding boxes in XYWH form.

use serde::{Deserialize, Serialize};

use super::point::Point;
use crate::error::EmojiCutError;

/// An axis-aligned bounding box (x, y, width, height) in pixel space.
///
/// Note: the plain constructor does NOT enforce a positive extent, so that
/// reductions like [`bounding_box_of`](super::bounding_box_of) can report a
/// zero box for degenerate input. Anything accepted into a selection or a
/// segmentation result goes through [`BoundingBox::checked`] instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Creates a box without validating its extent.
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a box, rejecting non-finite values and non-positive extents.
    pub fn checked(x: f64, y: f64, width: f64, height: f64) -> Result<Self, EmojiCutError> {
        let bbox = Self::new(x, y, width, height);
        if bbox.is_valid() {
            Ok(bbox)
        } else {
            Err(EmojiCutError::DegenerateRegion { width, height })
        }
    }

    /// Creates a box from min/max corners (XYXY).
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self::new(xmin, ymin, xmax - xmin, ymax - ymin)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }

    /// Returns true if all components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Returns true if the box is finite with a strictly positive extent.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::from_xyxy(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Edge-to-edge gap to `other` as `(horizontal, vertical)`.
    ///
    /// Each component is zero when the boxes overlap along that axis.
    pub fn gap_to(&self, other: &BoundingBox) -> (f64, f64) {
        let dx = (self.x.max(other.x) - self.right().min(other.right())).max(0.0);
        let dy = (self.y.max(other.y) - self.bottom().min(other.bottom())).max(0.0);
        (dx, dy)
    }

    /// Clips the box to `[0, width] x [0, height]`.
    ///
    /// The result may be degenerate if the box lies entirely outside.
    pub fn clipped_to(&self, width: f64, height: f64) -> BoundingBox {
        let xmin = self.x.clamp(0.0, width);
        let ymin = self.y.clamp(0.0, height);
        let xmax = self.right().clamp(0.0, width);
        let ymax = self.bottom().clamp(0.0, height);
        BoundingBox::from_xyxy(xmin, ymin, xmax, ymax)
    }

    /// Returns true if `other` lies fully inside this box.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &BoundingBox, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.width - other.width).abs() <= eps
            && (self.height - other.height).abs() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_from_xyxy() {
        let bbox = BoundingBox::from_xyxy(10.0, 20.0, 100.0, 80.0);
        assert_eq!(bbox.x, 10.0);
        assert_eq!(bbox.y, 20.0);
        assert_eq!(bbox.width, 90.0);
        assert_eq!(bbox.height, 60.0);
        assert_eq!(bbox.area(), 5400.0);
    }

    #[test]
    fn test_bbox_checked_rejects_degenerate() {
        assert!(BoundingBox::checked(0.0, 0.0, 10.0, 10.0).is_ok());
        assert!(BoundingBox::checked(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(BoundingBox::checked(0.0, 0.0, 10.0, -1.0).is_err());
        assert!(BoundingBox::checked(f64::NAN, 0.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_bbox_gap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(15.0, 5.0, 10.0, 10.0);
        assert_eq!(a.gap_to(&b), (5.0, 0.0));
        assert_eq!(b.gap_to(&a), (5.0, 0.0));

        let overlapping = BoundingBox::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.gap_to(&overlapping), (0.0, 0.0));
    }

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 30.0, 5.0, 5.0);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, 0.0, 25.0, 35.0));
    }

    #[test]
    fn test_bbox_clipped() {
        let bbox = BoundingBox::from_xyxy(-50.0, -50.0, 1500.0, 1500.0);
        let clipped = bbox.clipped_to(1000.0, 1000.0);
        assert_eq!(clipped, BoundingBox::new(0.0, 0.0, 1000.0, 1000.0));

        let outside = BoundingBox::new(2000.0, 0.0, 10.0, 10.0).clipped_to(1000.0, 1000.0);
        assert!(!outside.is_valid());
    }
}
