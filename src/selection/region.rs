//! User-editable selection regions and their geometric edits.
//!
//! Every edit returns a new region (or `None` when the edit is refused).
//! Whenever a polygon changes, the bounding box is recomputed from it; the
//! box never drives the polygon except through an explicit resize.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

use crate::geometry::{
    bounding_box_of, bounding_box_to_polygon, clamp, self_intersects, BoundingBox, Point, Polygon,
};
use crate::segment::{RegionId, RegionKind, SegmentationRegion};

/// A rectangle or polygon the user can move, resize and reshape.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionRegion {
    pub id: RegionId,
    pub kind: RegionKind,
    pub bounding_box: BoundingBox,
    pub polygon: Option<Polygon>,
    pub created_at: DateTime<Utc>,
    pub is_selected: bool,
}

/// Why a vertex list does not form a usable polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolygonIssue {
    /// Fewer than three vertices, so no ring can be formed.
    NotClosed,
    SelfIntersecting,
}

/// Result of [`validate_polygon`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolygonValidation {
    pub valid: bool,
    pub error: Option<PolygonIssue>,
}

/// Checks a vertex list for ring size and self-intersection.
pub fn validate_polygon(vertices: &[Point]) -> PolygonValidation {
    let error = if vertices.len() < 3 {
        Some(PolygonIssue::NotClosed)
    } else if self_intersects(&Polygon::new(vertices.to_vec())) {
        Some(PolygonIssue::SelfIntersecting)
    } else {
        None
    };
    PolygonValidation {
        valid: error.is_none(),
        error,
    }
}

impl SelectionRegion {
    /// Rectangle from a drag gesture in any direction, clipped to the image.
    ///
    /// Returns `None` if nothing of positive extent is left.
    pub fn create_rectangle(
        id: impl Into<RegionId>,
        start: Point,
        end: Point,
        image_width: f64,
        image_height: f64,
    ) -> Option<Self> {
        let xmin = start.x.min(end.x).clamp(0.0, image_width);
        let ymin = start.y.min(end.y).clamp(0.0, image_height);
        let xmax = start.x.max(end.x).clamp(0.0, image_width);
        let ymax = start.y.max(end.y).clamp(0.0, image_height);
        let bounding_box = BoundingBox::from_xyxy(xmin, ymin, xmax, ymax);
        if !bounding_box.is_valid() {
            return None;
        }
        Some(Self {
            id: id.into(),
            kind: RegionKind::Rectangle,
            bounding_box,
            polygon: None,
            created_at: Utc::now(),
            is_selected: false,
        })
    }

    /// Polygon from clicked vertices, each clamped into the image.
    ///
    /// Refused for fewer than three vertices, a self-intersecting ring, or a
    /// degenerate bound after clamping.
    pub fn create_polygon(
        id: impl Into<RegionId>,
        vertices: &[Point],
        image_width: f64,
        image_height: f64,
    ) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let polygon = Polygon::new(
            vertices
                .iter()
                .map(|&v| clamp(v, image_width, image_height))
                .collect(),
        );
        Self::from_polygon(id.into(), polygon, Utc::now(), false)
    }

    fn from_polygon(
        id: RegionId,
        polygon: Polygon,
        created_at: DateTime<Utc>,
        is_selected: bool,
    ) -> Option<Self> {
        if polygon.len() < 3 || self_intersects(&polygon) {
            return None;
        }
        let bounding_box = bounding_box_of(&polygon);
        if !bounding_box.is_valid() {
            return None;
        }
        Some(Self {
            id,
            kind: RegionKind::Polygon,
            bounding_box,
            polygon: Some(polygon),
            created_at,
            is_selected,
        })
    }

    fn with_polygon(&self, polygon: Polygon) -> Option<Self> {
        Self::from_polygon(self.id, polygon, self.created_at, self.is_selected)
    }

    /// Translates by as much of `(dx, dy)` as keeps the box inside the image.
    ///
    /// Each axis is limited independently; a polygon follows the box by the
    /// same achieved offset.
    pub fn moved(&self, dx: f64, dy: f64, image_width: f64, image_height: f64) -> Self {
        let b = self.bounding_box;
        let new_x = (b.x + dx).clamp(0.0, (image_width - b.width).max(0.0));
        let new_y = (b.y + dy).clamp(0.0, (image_height - b.height).max(0.0));
        let (actual_dx, actual_dy) = (new_x - b.x, new_y - b.y);

        let mut moved = self.clone();
        moved.bounding_box = BoundingBox::new(new_x, new_y, b.width, b.height);
        if let Some(polygon) = &self.polygon {
            moved.polygon = Some(polygon.translated(actual_dx, actual_dy));
        }
        moved
    }

    /// Replaces the box, clipped to the image.
    ///
    /// Polygon vertices are rescaled from the old box onto the new one; the
    /// resize is refused if that makes the ring self-intersect.
    pub fn resized(
        &self,
        new_box: BoundingBox,
        image_width: f64,
        image_height: f64,
    ) -> Option<Self> {
        let target = new_box.clipped_to(image_width, image_height);
        if !target.is_valid() {
            return None;
        }

        let Some(polygon) = &self.polygon else {
            let mut resized = self.clone();
            resized.bounding_box = target;
            return Some(resized);
        };

        let old = self.bounding_box;
        let sx = target.width / old.width;
        let sy = target.height / old.height;
        let scaled = Polygon::new(
            polygon
                .vertices
                .iter()
                .map(|v| {
                    Point::new(
                        target.x + (v.x - old.x) * sx,
                        target.y + (v.y - old.y) * sy,
                    )
                })
                .collect(),
        );
        self.with_polygon(scaled)
    }

    /// Moves one polygon vertex (clamped into the image).
    ///
    /// `None` for rectangles, a bad index, or an edit that self-intersects.
    pub fn with_vertex_moved(
        &self,
        index: usize,
        new_position: Point,
        image_width: f64,
        image_height: f64,
    ) -> Option<Self> {
        let polygon = self.polygon.as_ref()?;
        if index >= polygon.len() {
            return None;
        }
        let mut edited = polygon.clone();
        edited.vertices[index] = clamp(new_position, image_width, image_height);
        self.with_polygon(edited)
    }

    /// Inserts a vertex after `edge_index` (i.e. splitting that edge).
    pub fn with_vertex_inserted(
        &self,
        edge_index: usize,
        position: Point,
        image_width: f64,
        image_height: f64,
    ) -> Option<Self> {
        let polygon = self.polygon.as_ref()?;
        if edge_index >= polygon.len() {
            return None;
        }
        let mut edited = polygon.clone();
        edited
            .vertices
            .insert(edge_index + 1, clamp(position, image_width, image_height));
        self.with_polygon(edited)
    }

    /// The region's outline: its polygon, or the box as a 4-vertex ring.
    pub fn outline(&self) -> Polygon {
        match &self.polygon {
            Some(polygon) => polygon.clone(),
            None => bounding_box_to_polygon(&self.bounding_box),
        }
    }

    /// Hash of the id and geometry; equal regions give equal fingerprints.
    pub fn geometry_fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.kind.hash(&mut hasher);
        let b = self.bounding_box;
        for v in [b.x, b.y, b.width, b.height] {
            v.to_bits().hash(&mut hasher);
        }
        if let Some(polygon) = &self.polygon {
            for p in &polygon.vertices {
                p.x.to_bits().hash(&mut hasher);
                p.y.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

impl From<&SegmentationRegion> for SelectionRegion {
    /// Confidence and label are dropped; the user now owns the geometry.
    fn from(region: &SegmentationRegion) -> Self {
        let (kind, polygon, bounding_box) = match &region.polygon {
            Some(polygon) if region.kind == RegionKind::Polygon => {
                (RegionKind::Polygon, Some(polygon.clone()), bounding_box_of(polygon))
            }
            _ => (RegionKind::Rectangle, None, region.bounding_box),
        };
        Self {
            id: region.id,
            kind,
            bounding_box,
            polygon,
            created_at: Utc::now(),
            is_selected: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&p| p.into()).collect()
    }

    /// Rectangle dragged from `a` to `b` on a 100 x 100 image.
    fn rect(id: u64, a: (f64, f64), b: (f64, f64)) -> Option<SelectionRegion> {
        SelectionRegion::create_rectangle(id, a.into(), b.into(), 100.0, 100.0)
    }

    fn triangle() -> SelectionRegion {
        let vertices = pts(&[(10.0, 10.0), (30.0, 10.0), (20.0, 30.0)]);
        SelectionRegion::create_polygon(1, &vertices, 100.0, 100.0).expect("valid triangle")
    }

    #[test]
    fn test_create_rectangle_normalizes_drag() {
        let r = rect(1, (50.0, 60.0), (10.0, 20.0)).unwrap();
        assert_eq!(r.bounding_box, BoundingBox::new(10.0, 20.0, 40.0, 40.0));
        assert_eq!(r.kind, RegionKind::Rectangle);
        assert!(r.polygon.is_none());
    }

    #[test]
    fn test_create_rectangle_clamps_and_rejects() {
        let r = rect(1, (-20.0, -20.0), (150.0, 50.0)).unwrap();
        assert_eq!(r.bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 50.0));

        assert!(rect(1, (5.0, 5.0), (5.0, 50.0)).is_none());
        assert!(rect(1, (120.0, 5.0), (150.0, 50.0)).is_none());
    }

    #[test]
    fn test_create_polygon_rules() {
        let line = pts(&[(0.0, 0.0), (5.0, 5.0)]);
        assert!(SelectionRegion::create_polygon(1, &line, 100.0, 100.0).is_none());
        let bowtie = pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(SelectionRegion::create_polygon(1, &bowtie, 100.0, 100.0).is_none());

        let t = triangle();
        assert_eq!(t.bounding_box, BoundingBox::new(10.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn test_move_clamps_per_axis() {
        let r = rect(1, (80.0, 10.0), (90.0, 20.0)).unwrap();
        let moved = r.moved(50.0, 30.0, 100.0, 100.0);
        // x blocked after 10px, y moves freely
        assert_eq!(moved.bounding_box, BoundingBox::new(90.0, 40.0, 10.0, 10.0));
    }

    #[test]
    fn test_move_polygon_follows_actual_delta() {
        let t = triangle();
        let moved = t.moved(-50.0, 5.0, 100.0, 100.0);
        assert_eq!(moved.bounding_box.x, 0.0);
        assert_eq!(moved.bounding_box.y, 15.0);
        assert_eq!(bounding_box_of(moved.polygon.as_ref().unwrap()), moved.bounding_box);
        assert_eq!(moved.polygon.unwrap().vertices[0], Point::new(0.0, 15.0));
    }

    #[test]
    fn test_resize_rescales_polygon() {
        let t = triangle();
        let resized = t.resized(BoundingBox::new(0.0, 0.0, 40.0, 40.0), 100.0, 100.0).unwrap();
        let poly = resized.polygon.as_ref().unwrap();
        assert_eq!(poly.vertices, pts(&[(0.0, 0.0), (40.0, 0.0), (20.0, 40.0)]));
        assert_eq!(resized.bounding_box, BoundingBox::new(0.0, 0.0, 40.0, 40.0));
    }

    #[test]
    fn test_resize_rejects_degenerate() {
        let t = triangle();
        assert!(t.resized(BoundingBox::new(200.0, 0.0, 40.0, 40.0), 100.0, 100.0).is_none());
        assert!(t.resized(BoundingBox::new(10.0, 10.0, 0.0, 40.0), 100.0, 100.0).is_none());
    }

    #[test]
    fn test_move_vertex() {
        let square = SelectionRegion::create_polygon(
            1,
            &pts(&[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)]),
            100.0,
            100.0,
        )
        .unwrap();

        let pulled = square.with_vertex_moved(2, Point::new(40.0, 50.0), 100.0, 100.0).unwrap();
        assert_eq!(pulled.bounding_box, BoundingBox::new(10.0, 10.0, 30.0, 40.0));

        // dragging a corner across the opposite edge folds the ring
        assert!(square.with_vertex_moved(2, Point::new(15.0, 0.0), 100.0, 100.0).is_none());
        assert!(square.with_vertex_moved(9, Point::new(5.0, 5.0), 100.0, 100.0).is_none());

        let plain = rect(2, (0.0, 0.0), (5.0, 5.0)).unwrap();
        assert!(plain.with_vertex_moved(0, Point::new(1.0, 1.0), 100.0, 100.0).is_none());
    }

    #[test]
    fn test_insert_vertex() {
        let t = triangle();
        let split = t.with_vertex_inserted(0, Point::new(20.0, 0.0), 100.0, 100.0).unwrap();
        let poly = split.polygon.as_ref().unwrap();
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.vertices[1], Point::new(20.0, 0.0));
        assert_eq!(split.bounding_box, BoundingBox::new(10.0, 0.0, 20.0, 30.0));
    }

    #[test]
    fn test_validate_polygon() {
        let v = validate_polygon(&pts(&[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(v.error, Some(PolygonIssue::NotClosed));
        assert!(!v.valid);

        let v = validate_polygon(&pts(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]));
        assert_eq!(v.error, Some(PolygonIssue::SelfIntersecting));

        let v = validate_polygon(&pts(&[(0.0, 0.0), (10.0, 0.0), (5.0, 5.0)]));
        assert!(v.valid);
        assert_eq!(v.error, None);
    }

    #[test]
    fn test_fingerprint_tracks_geometry() {
        let t = triangle();
        let same = t.clone();
        let moved = t.moved(1.0, 0.0, 100.0, 100.0);
        assert_eq!(t.geometry_fingerprint(), same.geometry_fingerprint());
        assert_ne!(t.geometry_fingerprint(), moved.geometry_fingerprint());
    }
}
