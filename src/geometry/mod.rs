//! Geometry kernel: points, boxes, polygons and the math over them.
//!
//! Everything here is pure and allocation-light. Predicates return `bool`
//! and reductions never fail; rejecting degenerate results is the caller's
//! job (see [`BoundingBox::checked`]).
//!
//! # Example
//!
//! ```
//! use emojicut::geometry::{bounding_box_to_polygon, rectangle_to_bounding_box, BoundingBox};
//!
//! let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
//! let ring = bounding_box_to_polygon(&bbox);
//! let restored = rectangle_to_bounding_box(ring.vertices[0], ring.vertices[2]);
//! assert!(restored.approx_eq(&bbox, 1e-9));
//! ```

mod bbox;
mod point;
mod polygon;

pub use bbox::BoundingBox;
pub use point::Point;
pub use polygon::{
    bounding_box_of, is_convex, is_valid_polygon, point_in_polygon, self_intersects, Polygon,
};

/// Clamps a point into `[0, width) x [0, height)`.
///
/// Values at or beyond a dimension land on the largest `f64` strictly below
/// it, so the result always addresses a pixel inside the image.
pub fn clamp(point: Point, width: f64, height: f64) -> Point {
    Point::new(clamp_axis(point.x, width), clamp_axis(point.y, height))
}

fn clamp_axis(value: f64, limit: f64) -> f64 {
    if limit.is_nan() || limit <= 0.0 {
        return 0.0;
    }
    if value.is_nan() || value < 0.0 {
        0.0
    } else if value >= limit {
        below(limit)
    } else {
        value
    }
}

/// Largest representable value strictly below a positive finite `limit`.
fn below(limit: f64) -> f64 {
    if limit.is_infinite() {
        f64::MAX
    } else {
        f64::from_bits(limit.to_bits() - 1)
    }
}

/// Converts percentage coordinates (0-100) into pixel coordinates.
///
/// `0%` maps to `0` and `100%` maps to the dimension exactly. Pixel input
/// (`is_percentage == false`) passes through unchanged.
pub fn normalize(point: Point, width: f64, height: f64, is_percentage: bool) -> Point {
    if !is_percentage {
        return point;
    }
    Point::new(point.x / 100.0 * width, point.y / 100.0 * height)
}

/// Box spanned by a top-left and bottom-right corner.
pub fn rectangle_to_bounding_box(top_left: Point, bottom_right: Point) -> BoundingBox {
    BoundingBox::new(
        top_left.x,
        top_left.y,
        bottom_right.x - top_left.x,
        bottom_right.y - top_left.y,
    )
}

/// Four-vertex ring in the order top-left, top-right, bottom-right, bottom-left.
pub fn bounding_box_to_polygon(bbox: &BoundingBox) -> Polygon {
    Polygon::new(vec![
        Point::new(bbox.x, bbox.y),
        Point::new(bbox.right(), bbox.y),
        Point::new(bbox.right(), bbox.bottom()),
        Point::new(bbox.x, bbox.bottom()),
    ])
}
