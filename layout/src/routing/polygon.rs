//! Convex polygons that act as obstacles for edge routing. The vertices are
//! kept in counter-clockwise order (positive Point::cross turns) without
//! collinear points, which makes extreme point and tangent queries bimodal
//! searches over the vertex list.

use super::extreme::BimodalSequence;
use crate::core::curve::segments_cross_properly;
use crate::core::geometry::{
    convex_hull, ellipse_points, segment_rect_intersection, Point, Rectangle,
};

/// The number of vertices in ellipse approximations.
const ELLIPSE_VERTICES: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
    bbox: Rectangle,
}

impl Polygon {
    /// Create the convex hull of \p points.
    pub fn new(points: &[Point]) -> Self {
        let points = convex_hull(points);
        let mut bbox = Rectangle::empty();
        for p in points.iter() {
            bbox.add_point(*p);
        }
        Self { points, bbox }
    }

    pub fn from_rectangle(r: &Rectangle) -> Self {
        Self::new(&r.corners())
    }

    /// Create a polygon that contains the ellipse inscribed in \p r.
    pub fn from_ellipse(r: &Rectangle) -> Self {
        // Push the vertices out so that the polygon edges don't cut into the
        // ellipse.
        let grow = 1. / (std::f64::consts::PI / ELLIPSE_VERTICES as f64).cos();
        let size = r.size().scale(grow);
        Self::new(&ellipse_points(r.center(), size, ELLIPSE_VERTICES))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// \returns the vertex \p i, with cyclic indexing.
    pub fn point(&self, i: usize) -> Point {
        self.points[i % self.points.len()]
    }

    pub fn next_index(&self, i: usize) -> usize {
        (i + 1) % self.points.len()
    }

    pub fn prev_index(&self, i: usize) -> usize {
        (i + self.points.len() - 1) % self.points.len()
    }

    pub fn bounding_box(&self) -> Rectangle {
        self.bbox
    }

    pub fn centroid(&self) -> Point {
        let mut sum = Point::zero();
        for p in self.points.iter() {
            sum = sum.add(*p);
        }
        sum.scale(1. / self.points.len().max(1) as f64)
    }

    /// Grow the polygon by \p d by moving each edge outwards.
    pub fn pad(&self, d: f64) -> Polygon {
        let n = self.points.len();
        if n < 3 {
            return Polygon::from_rectangle(&self.bbox.pad(d));
        }
        let mut res = Vec::with_capacity(n);
        for i in 0..n {
            let prev = self.point(i + n - 1);
            let curr = self.point(i);
            let next = self.point(i + 1);
            // The outward normals of the two edges at the vertex (the polygon
            // is counter-clockwise, so the outside is on the right).
            let n0 = curr.sub(prev).perpendicular().neg();
            let n1 = next.sub(curr).perpendicular().neg();
            let n0 = n0.scale(1. / n0.length());
            let n1 = n1.scale(1. / n1.length());
            let miter = n0.add(n1).scale(d / (1. + n0.dot(n1)));
            res.push(curr.add(miter));
        }
        Polygon::new(&res)
    }

    /// \returns True if \p p is inside the polygon or within \p eps of it.
    pub fn contains(&self, p: Point, eps: f64) -> bool {
        self.side_distances(p).all(|d| d >= -eps)
    }

    /// \returns True if \p p is inside the polygon and farther than \p eps
    /// from its boundary.
    pub fn contains_strict(&self, p: Point, eps: f64) -> bool {
        if self.points.len() < 3 || !self.bbox.contains(p) {
            return false;
        }
        self.side_distances(p).all(|d| d > eps)
    }

    // The signed distances of \p p from the lines of the edges. Positive
    // values are on the inner side.
    fn side_distances(&self, p: Point) -> impl Iterator<Item = f64> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let e = b.sub(a);
            e.cross(p.sub(a)) / e.length().max(1e-12)
        })
    }

    /// \returns the index of the vertex that goes farthest in the direction
    /// \p dir.
    pub fn extreme_in_direction(&self, dir: Point) -> usize {
        let seq = BimodalSequence::new(|i| self.points[i].dot(dir), self.points.len());
        seq.find_maximum().unwrap_or(0)
    }

    /// \returns the two tangent vertices of the polygon as seen from the
    /// outside point \p p: the vertex seen at the most clockwise angle and
    /// the vertex seen at the most counter-clockwise angle. \returns None if
    /// \p p is inside the polygon.
    pub fn tangents_from(&self, p: Point) -> Option<(usize, usize)> {
        if self.points.is_empty() || self.contains(p, 1e-9) {
            return None;
        }
        let axis = self.centroid().sub(p);
        let angle = |i: usize| {
            let v = self.points[i].sub(p);
            axis.cross(v).atan2(axis.dot(v))
        };
        let seq = BimodalSequence::new(angle, self.points.len());
        Some((seq.find_minimum()?, seq.find_maximum()?))
    }

    /// \returns True if the segment from \p from to the vertex \p i does not
    /// enter the polygon near the vertex, which means that both neighbors
    /// of the vertex are on the same side of the line.
    pub fn is_locally_tangent(&self, i: usize, from: Point, eps: f64) -> bool {
        if self.points.len() < 3 {
            return true;
        }
        let v = self.points[i];
        let dir = v.sub(from);
        let len = dir.length();
        if len < eps {
            return true;
        }
        let side = |q: Point| dir.cross(q.sub(v)) / len;
        let a = side(self.points[self.prev_index(i)]);
        let b = side(self.points[self.next_index(i)]);
        (a >= -eps && b >= -eps) || (a <= eps && b <= eps)
    }

    /// \returns True if the segment (a, b) is blocked by the polygon: it
    /// properly crosses the boundary, or both endpoints are outside and the
    /// segment passes through the interior.
    pub fn blocks_segment(&self, a: Point, b: Point, eps: f64) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        if !segment_rect_intersection((a, b), (self.bbox.min, self.bbox.max)) {
            return false;
        }
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            if segments_cross_properly(a, b, p, q, eps) {
                return true;
            }
        }
        let a_out = !self.contains_strict(a, eps);
        let b_out = !self.contains_strict(b, eps);
        a_out && b_out && self.contains_strict(a.midpoint(b), eps)
    }
}

#[test]
fn test_polygon_queries() {
    let r = Rectangle::new(Point::new(0., 0.), Point::new(10., 10.));
    let poly = Polygon::from_rectangle(&r);
    assert_eq!(poly.len(), 4);
    assert!(poly.contains_strict(Point::new(5., 5.), 1e-9));
    assert!(!poly.contains_strict(Point::new(0., 5.), 1e-9));
    assert!(poly.contains(Point::new(0., 5.), 1e-9));

    let idx = poly.extreme_in_direction(Point::new(1., 1.));
    assert_eq!(poly.point(idx), Point::new(10., 10.));

    // Tangents from a point on the left.
    let (t0, t1) = poly.tangents_from(Point::new(-10., 5.)).unwrap();
    let mut tangents = vec![poly.point(t0), poly.point(t1)];
    tangents.sort_by(|a, b| a.y.total_cmp(&b.y));
    assert_eq!(tangents, vec![Point::new(0., 0.), Point::new(0., 10.)]);
    assert!(poly.is_locally_tangent(t0, Point::new(-10., 5.), 1e-9));
    assert!(poly.tangents_from(Point::new(5., 5.)).is_none());

    // A segment through the box, and along its side.
    assert!(poly.blocks_segment(Point::new(-5., 5.), Point::new(15., 5.), 1e-9));
    assert!(!poly.blocks_segment(Point::new(0., -5.), Point::new(0., 15.), 1e-9));
    // A diagonal between two corners passes through the interior.
    assert!(poly.blocks_segment(Point::new(0., 0.), Point::new(10., 10.), 1e-9));
    // Leaving the polygon from the inside crosses the boundary.
    assert!(poly.blocks_segment(Point::new(5., 5.), Point::new(15., 5.), 1e-9));
    // Segments inside the polygon are not blocked.
    assert!(!poly.blocks_segment(Point::new(2., 2.), Point::new(8., 3.), 1e-9));
}

#[test]
fn test_pad_and_ellipse() {
    let r = Rectangle::new(Point::new(0., 0.), Point::new(10., 4.));
    let padded = Polygon::from_rectangle(&r).pad(2.);
    assert!(padded.bounding_box().min.is_close_to(Point::new(-2., -2.), 1e-9));
    assert!(padded.bounding_box().max.is_close_to(Point::new(12., 6.), 1e-9));

    let e = Polygon::from_ellipse(&r);
    assert_eq!(e.len(), ELLIPSE_VERTICES);
    // The ellipse fits in the polygon.
    for p in ellipse_points(r.center(), r.size(), 64) {
        assert!(e.contains(p, 1e-9));
    }
}
