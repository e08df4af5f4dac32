//! Polygon rings and the predicates over them.

use serde::{Deserialize, Serialize};

use super::bbox::BoundingBox;
use super::point::Point;

/// An ordered ring of vertices with no explicit closing duplicate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates the ring's edges as `(start, end)` pairs, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Returns a copy translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Polygon {
        Polygon::new(self.vertices.iter().map(|p| p.translated(dx, dy)).collect())
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(vertices: Vec<Point>) -> Self {
        Self::new(vertices)
    }
}

/// A polygon needs at least three vertices to form a ring.
///
/// Self-intersection is a separate check ([`self_intersects`]) applied when
/// selections are edited.
pub fn is_valid_polygon(polygon: Option<&Polygon>) -> bool {
    polygon.is_some_and(|p| p.vertices.len() >= 3)
}

/// Tight axis-aligned bound of the vertices.
///
/// Empty input yields the zero box; callers reject degenerate boxes themselves.
pub fn bounding_box_of(polygon: &Polygon) -> BoundingBox {
    let Some(first) = polygon.vertices.first() else {
        return BoundingBox::default();
    };

    let (mut xmin, mut ymin, mut xmax, mut ymax) = (first.x, first.y, first.x, first.y);
    for p in &polygon.vertices[1..] {
        xmin = xmin.min(p.x);
        ymin = ymin.min(p.y);
        xmax = xmax.max(p.x);
        ymax = ymax.max(p.y);
    }
    BoundingBox::from_xyxy(xmin, ymin, xmax, ymax)
}

/// Ray-casting parity test.
///
/// Points exactly on an edge may land on either side; only clearly interior
/// or exterior points have a defined answer.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> bool {
    let vs = &polygon.vertices;
    let n = vs.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (vs[i], vs[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Convexity by consistent cross-product sign; collinear triples are skipped.
pub fn is_convex(polygon: &Polygon) -> bool {
    let vs = &polygon.vertices;
    let n = vs.len();
    if n < 3 {
        return false;
    }

    let mut sign = 0.0f64;
    for i in 0..n {
        let a = vs[i];
        let b = vs[(i + 1) % n];
        let c = vs[(i + 2) % n];
        let cross = cross(a, b, c);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// True if any two non-adjacent edges intersect (touching counts).
pub fn self_intersects(polygon: &Polygon) -> bool {
    let vs = &polygon.vertices;
    let n = vs.len();
    if n < 4 {
        return false;
    }

    for i in 0..n {
        let (a1, a2) = (vs[i], vs[(i + 1) % n]);
        for j in (i + 2)..n {
            // first and last edge share vertex 0
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (vs[j], vs[(j + 1) % n]);
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

#[inline]
fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: Point, q: Point, r: Point) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, p1, q2))
        || (d2 == 0.0 && on_segment(q1, p2, q2))
        || (d3 == 0.0 && on_segment(p1, q1, p2))
        || (d4 == 0.0 && on_segment(p1, q2, p2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(points: &[(f64, f64)]) -> Polygon {
        Polygon::new(points.iter().map(|&p| p.into()).collect())
    }

    #[test]
    fn test_is_valid_polygon() {
        assert!(!is_valid_polygon(None));
        assert!(!is_valid_polygon(Some(&poly(&[]))));
        assert!(!is_valid_polygon(Some(&poly(&[(0.0, 0.0), (1.0, 1.0)]))));
        assert!(is_valid_polygon(Some(&poly(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]))));
    }

    #[test]
    fn test_bounding_box_of() {
        let p = poly(&[(10.0, 5.0), (30.0, 15.0), (20.0, 40.0)]);
        assert_eq!(bounding_box_of(&p), BoundingBox::new(10.0, 5.0, 20.0, 35.0));
        assert_eq!(bounding_box_of(&poly(&[])), BoundingBox::default());
        assert!(!bounding_box_of(&poly(&[(3.0, 3.0)])).is_valid());
    }

    #[test]
    fn test_point_in_polygon() {
        let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(-1.0, -1.0), &square));

        // concave "L"
        let l_shape = poly(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (4.0, 4.0),
            (4.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(point_in_polygon(Point::new(2.0, 8.0), &l_shape));
        assert!(!point_in_polygon(Point::new(8.0, 8.0), &l_shape));
    }

    #[test]
    fn test_is_convex() {
        let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(is_convex(&square));

        let with_collinear =
            poly(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(is_convex(&with_collinear));

        let arrow = poly(&[(0.0, 0.0), (10.0, 5.0), (0.0, 10.0), (3.0, 5.0)]);
        assert!(!is_convex(&arrow));

        assert!(!is_convex(&poly(&[(0.0, 0.0), (1.0, 1.0)])));
    }

    #[test]
    fn test_self_intersects() {
        let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(!self_intersects(&square));

        let bowtie = poly(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(self_intersects(&bowtie));

        let triangle = poly(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]);
        assert!(!self_intersects(&triangle));
    }

    #[test]
    fn test_translated() {
        let p = poly(&[(1.0, 1.0), (2.0, 1.0), (1.0, 2.0)]).translated(1.0, -1.0);
        assert_eq!(p, poly(&[(2.0, 0.0), (3.0, 0.0), (2.0, 1.0)]));
    }
}
