//! Smoothing of routed paths. The shortest path in the visibility graph hugs
//! the obstacles. The relaxation pulls the bends of the path away from the
//! obstacle corners, toward the midpoint of their neighbors, as long as the
//! path stays clear. The smoothed polyline is then turned into a curve by
//! replacing the corners with Bezier fillets.

use crate::core::curve::{Curve, Segment};
use crate::core::geometry::{interpolate, Point};

/// A node in the doubly linked list of a relaxed polyline.
#[derive(Debug, Clone, Copy)]
pub struct RelaxedPolylinePoint {
    /// The position before the relaxation.
    pub original: Point,
    pub point: Point,
    pub next: Option<usize>,
    pub prev: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct RelaxedPolyline {
    nodes: Vec<RelaxedPolylinePoint>,
    head: Option<usize>,
}

/// The fractions of the move toward the midpoint that the relaxation tries.
const STEPS: [f64; 3] = [1., 0.5, 0.25];

impl RelaxedPolyline {
    pub fn new(points: &[Point]) -> Self {
        let n = points.len();
        let nodes = points
            .iter()
            .enumerate()
            .map(|(i, p)| RelaxedPolylinePoint {
                original: *p,
                point: *p,
                next: if i + 1 < n { Some(i + 1) } else { None },
                prev: if i > 0 { Some(i - 1) } else { None },
            })
            .collect();
        Self {
            nodes,
            head: if n > 0 { Some(0) } else { None },
        }
    }

    pub fn node(&self, idx: usize) -> &RelaxedPolylinePoint {
        &self.nodes[idx]
    }

    /// \returns the indices of the live nodes, from the head.
    pub fn indices(&self) -> Vec<usize> {
        let mut res = Vec::new();
        let mut curr = self.head;
        while let Some(idx) = curr {
            res.push(idx);
            curr = self.nodes[idx].next;
        }
        res
    }

    pub fn points(&self) -> Vec<Point> {
        self.indices().iter().map(|i| self.nodes[*i].point).collect()
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Unlink the node \p idx. The ends of the polyline can't be removed.
    fn unlink(&mut self, idx: usize) {
        let node = self.nodes[idx];
        let (Some(prev), Some(next)) = (node.prev, node.next) else {
            panic!("Removing the end of a polyline");
        };
        self.nodes[prev].next = Some(next);
        self.nodes[next].prev = Some(prev);
    }

    /// Move the interior points toward the midpoint of their neighbors for
    /// \p passes iterations. A move is taken only if \p is_clear accepts the
    /// two new segments. The ends of the polyline don't move.
    pub fn relax<F>(&mut self, passes: usize, is_clear: F)
    where
        F: Fn(Point, Point) -> bool,
    {
        for _ in 0..passes {
            let mut moved = false;
            for idx in self.indices() {
                let node = self.nodes[idx];
                let (Some(prev), Some(next)) = (node.prev, node.next) else {
                    continue;
                };
                let a = self.nodes[prev].point;
                let b = self.nodes[next].point;
                let target = a.midpoint(b);
                if target.is_close_to(node.point, 1e-9) {
                    continue;
                }
                for step in STEPS {
                    let candidate = interpolate(target, node.point, step);
                    if is_clear(a, candidate) && is_clear(candidate, b) {
                        self.nodes[idx].point = candidate;
                        moved = true;
                        break;
                    }
                }
            }
            if !moved {
                break;
            }
        }
    }

    /// Remove the interior points that are on the line between their
    /// neighbors (up to \p eps), and points that coincide with a neighbor.
    pub fn remove_collinear(&mut self, eps: f64) {
        for idx in self.indices() {
            let node = self.nodes[idx];
            let (Some(prev), Some(next)) = (node.prev, node.next) else {
                continue;
            };
            let a = self.nodes[prev].point;
            let b = self.nodes[next].point;
            let ab = b.sub(a);
            let len = ab.length();
            let coincides = node.point.is_close_to(a, eps) || node.point.is_close_to(b, eps);
            let collinear = len > eps
                && (ab.cross(node.point.sub(a)) / len).abs() <= eps
                && node.point.sub(a).dot(ab) >= 0.
                && node.point.sub(b).dot(ab) <= 0.;
            if coincides || collinear {
                self.unlink(idx);
            }
        }
    }
}

/// Turn the polyline \p points into a smooth curve. Each corner is replaced
/// by a cubic Bezier that starts and ends on the two segments of the corner,
/// at most \p max_cut away from the corner (and never beyond the middle of a
/// segment).
pub fn smooth_polyline(points: &[Point], max_cut: f64) -> Curve {
    let mut curve = Curve::new();
    if points.len() < 2 {
        return curve;
    }
    if points.len() == 2 {
        curve.add_segment(Segment::line(points[0], points[1]));
        return curve;
    }

    let cut_toward = |corner: Point, other: Point| {
        let d = other.sub(corner);
        let len = d.length();
        if len == 0. {
            return corner;
        }
        corner.add(d.scale((len / 2.).min(max_cut) / len))
    };

    let mut current = points[0];
    for i in 1..points.len() - 1 {
        let corner = points[i];
        let enter = cut_toward(corner, points[i - 1]);
        let exit = cut_toward(corner, points[i + 1]);
        if !current.is_close_to(enter, 1e-9) {
            curve.add_segment(Segment::line(current, enter));
        }
        // A cubic with the control points at 2/3 of the way to the corner
        // traces the quadratic Bezier of the corner.
        let c1 = interpolate(corner, enter, 2. / 3.);
        let c2 = interpolate(corner, exit, 2. / 3.);
        curve.add_segment(Segment::bezier(enter, c1, c2, exit));
        current = exit;
    }
    let last = points[points.len() - 1];
    if !current.is_close_to(last, 1e-9) {
        curve.add_segment(Segment::line(current, last));
    }
    curve
}

#[cfg(test)]
use super::{polygon::Polygon, visibility::segment_enters};
#[cfg(test)]
use crate::core::geometry::Rectangle;

#[test]
fn test_relax() {
    let pts = vec![
        Point::new(0., 0.),
        Point::new(5., 10.),
        Point::new(10., 0.),
    ];

    // Without obstacles the bend is pulled straight.
    let mut poly = RelaxedPolyline::new(&pts);
    poly.relax(4, |_, _| true);
    poly.remove_collinear(1e-6);
    assert_eq!(poly.points(), vec![Point::new(0., 0.), Point::new(10., 0.)]);
    // The original positions are kept.
    assert_eq!(poly.node(1).original, Point::new(5., 10.));

    // An obstacle under the bend stops every move.
    let obstacle = Polygon::from_rectangle(&Rectangle::new(
        Point::new(4., -2.),
        Point::new(6., 6.5),
    ));
    let mut poly = RelaxedPolyline::new(&pts);
    poly.relax(8, |a, b| !segment_enters(&obstacle, a, b));
    assert_eq!(poly.len(), 3);
    assert_eq!(poly.points()[1], Point::new(5., 10.));
}

#[test]
fn test_remove_collinear() {
    let pts = vec![
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(1., 0.),
        Point::new(2., 0.),
        Point::new(2., 5.),
    ];
    let mut poly = RelaxedPolyline::new(&pts);
    poly.remove_collinear(1e-9);
    assert_eq!(
        poly.points(),
        vec![Point::new(0., 0.), Point::new(2., 0.), Point::new(2., 5.)]
    );
}

#[test]
fn test_smooth_polyline() {
    let pts = vec![
        Point::new(0., 0.),
        Point::new(10., 0.),
        Point::new(10., 10.),
    ];
    let curve = smooth_polyline(&pts, 2.);
    assert_eq!(curve.start(), Some(Point::new(0., 0.)));
    assert_eq!(curve.end(), Some(Point::new(10., 10.)));
    // line, fillet, line.
    assert_eq!(curve.len(), 3);
    let bbox = curve.bounding_box();
    assert!(bbox.max.x <= 10. + 1e-9);
    assert!(bbox.min.y >= -1e-9);

    let line = smooth_polyline(&pts[..2], 2.);
    assert_eq!(line.len(), 1);
}
