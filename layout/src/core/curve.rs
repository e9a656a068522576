//! Edge curves. A curve is a continuous chain of segments, where each segment
//! is a line, a cubic bezier or an elliptic arc. This module also contains the
//! segment intersection and segment distance routines that the router uses.

use super::geometry::{Point, Rectangle};

/// A straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

/// A cubic bezier curve with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

/// An arc of the ellipse `center + cos(t) * axis_a + sin(t) * axis_b` for t
/// in the range [start_angle, end_angle].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseArc {
    pub center: Point,
    pub axis_a: Point,
    pub axis_b: Point,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// The closed set of segment kinds that make up a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(LineSegment),
    Bezier(CubicBezier),
    Arc(EllipseArc),
}

impl Segment {
    pub fn line(start: Point, end: Point) -> Self {
        Segment::Line(LineSegment { start, end })
    }

    pub fn bezier(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Segment::Bezier(CubicBezier { p0, p1, p2, p3 })
    }

    pub fn start(&self) -> Point {
        self.value_at(0.)
    }

    pub fn end(&self) -> Point {
        self.value_at(1.)
    }

    /// \returns the point at the normalized parameter \p t in [0, 1].
    pub fn value_at(&self, t: f64) -> Point {
        match self {
            Segment::Line(l) => l.start.add(l.end.sub(l.start).scale(t)),
            Segment::Bezier(b) => {
                let s = 1. - t;
                b.p0.scale(s * s * s)
                    .add(b.p1.scale(3. * s * s * t))
                    .add(b.p2.scale(3. * s * t * t))
                    .add(b.p3.scale(t * t * t))
            }
            Segment::Arc(a) => {
                let angle = a.start_angle + (a.end_angle - a.start_angle) * t;
                a.center
                    .add(a.axis_a.scale(angle.cos()))
                    .add(a.axis_b.scale(angle.sin()))
            }
        }
    }

    /// \returns the derivative with respect to the normalized parameter \p t.
    pub fn derivative_at(&self, t: f64) -> Point {
        match self {
            Segment::Line(l) => l.end.sub(l.start),
            Segment::Bezier(b) => {
                let s = 1. - t;
                b.p1.sub(b.p0)
                    .scale(3. * s * s)
                    .add(b.p2.sub(b.p1).scale(6. * s * t))
                    .add(b.p3.sub(b.p2).scale(3. * t * t))
            }
            Segment::Arc(a) => {
                let span = a.end_angle - a.start_angle;
                let angle = a.start_angle + span * t;
                a.axis_a
                    .scale(-angle.sin())
                    .add(a.axis_b.scale(angle.cos()))
                    .scale(span)
            }
        }
    }

    /// \returns a box that contains the segment. For beziers this is the box
    /// of the control polygon.
    pub fn bounding_box(&self) -> Rectangle {
        match self {
            Segment::Line(l) => Rectangle::new(l.start, l.end),
            Segment::Bezier(b) => {
                let mut r = Rectangle::new(b.p0, b.p3);
                r.add_point(b.p1);
                r.add_point(b.p2);
                r
            }
            Segment::Arc(_) => {
                let mut r = Rectangle::new(self.start(), self.end());
                for i in 1..32 {
                    r.add_point(self.value_at(i as f64 / 32.));
                }
                r
            }
        }
    }

    pub fn reversed(&self) -> Segment {
        match self {
            Segment::Line(l) => Segment::line(l.end, l.start),
            Segment::Bezier(b) => Segment::bezier(b.p3, b.p2, b.p1, b.p0),
            Segment::Arc(a) => Segment::Arc(EllipseArc {
                start_angle: a.end_angle,
                end_angle: a.start_angle,
                ..*a
            }),
        }
    }

    /// Approximate the length of the segment by sampling.
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line(l) => l.start.distance_to(l.end),
            _ => {
                let mut len = 0.;
                let mut prev = self.start();
                for i in 1..=32 {
                    let p = self.value_at(i as f64 / 32.);
                    len += prev.distance_to(p);
                    prev = p;
                }
                len
            }
        }
    }
}

/// A chain of segments where each segment starts where the previous ended.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Curve {
    segments: Vec<Segment>,
}

impl Curve {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a curve of line segments through \p points.
    pub fn from_polyline(points: &[Point]) -> Self {
        let mut c = Curve::new();
        for w in points.windows(2) {
            c.add_segment(Segment::line(w[0], w[1]));
        }
        c
    }

    pub fn add_segment(&mut self, seg: Segment) {
        if let Some(last) = self.segments.last() {
            let gap = last.end().distance_to(seg.start());
            assert!(gap < 1e-6 * (1. + gap.abs()) + 1e-6, "Disconnected curve");
        }
        self.segments.push(seg);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start())
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end())
    }

    pub fn bounding_box(&self) -> Rectangle {
        let mut r = Rectangle::empty();
        for s in &self.segments {
            r = r.union(&s.bounding_box());
        }
        r
    }

    /// \returns the point at parameter \p t in [0, 1], where each segment
    /// covers an equal share of the range.
    pub fn value_at(&self, t: f64) -> Option<Point> {
        if self.segments.is_empty() {
            return None;
        }
        let n = self.segments.len() as f64;
        let scaled = (t.max(0.).min(1.)) * n;
        let idx = (scaled.floor() as usize).min(self.segments.len() - 1);
        Some(self.segments[idx].value_at(scaled - idx as f64))
    }

    pub fn length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// Sample the curve into a polyline, with \p n points per segment.
    pub fn flatten(&self, n: usize) -> Vec<Point> {
        let mut res = Vec::new();
        for (i, s) in self.segments.iter().enumerate() {
            let first = if i == 0 { 0 } else { 1 };
            for k in first..=n {
                res.push(s.value_at(k as f64 / n as f64));
            }
        }
        res
    }

    /// \returns the point of the curve that is closest to \p p, measured on
    /// the polyline that samples each segment \p n times.
    pub fn nearest_point(&self, p: Point, n: usize) -> Option<Point> {
        let points = self.flatten(n);
        let mut best = (f64::INFINITY, *points.first()?);
        for w in points.windows(2) {
            let ab = w[1].sub(w[0]);
            let len2 = ab.dot(ab);
            let t = if len2 == 0. {
                0.
            } else {
                (p.sub(w[0]).dot(ab) / len2).clamp(0., 1.)
            };
            let q = w[0].add(ab.scale(t));
            let d = q.distance_to(p);
            if d < best.0 {
                best = (d, q);
            }
        }
        Some(best.1)
    }

    pub fn translate(&mut self, d: Point) {
        for s in self.segments.iter_mut() {
            match s {
                Segment::Line(l) => {
                    l.start = l.start.add(d);
                    l.end = l.end.add(d);
                }
                Segment::Bezier(b) => {
                    b.p0 = b.p0.add(d);
                    b.p1 = b.p1.add(d);
                    b.p2 = b.p2.add(d);
                    b.p3 = b.p3.add(d);
                }
                Segment::Arc(a) => a.center = a.center.add(d),
            }
        }
    }

    pub fn transpose(&mut self) {
        for s in self.segments.iter_mut() {
            *s = match s {
                Segment::Line(l) => Segment::line(l.start.transpose(), l.end.transpose()),
                Segment::Bezier(b) => Segment::bezier(
                    b.p0.transpose(),
                    b.p1.transpose(),
                    b.p2.transpose(),
                    b.p3.transpose(),
                ),
                Segment::Arc(a) => Segment::Arc(EllipseArc {
                    center: a.center.transpose(),
                    axis_a: a.axis_a.transpose(),
                    axis_b: a.axis_b.transpose(),
                    ..*a
                }),
            };
        }
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (i, s) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match s {
                Segment::Line(l) => write!(f, "L[{} {}]", l.start, l.end)?,
                Segment::Bezier(b) => {
                    write!(f, "C[{} {} {} {}]", b.p0, b.p1, b.p2, b.p3)?
                }
                Segment::Arc(_) => write!(f, "A[{} {}]", s.start(), s.end())?,
            }
        }
        Ok(())
    }
}

/// \returns the intersection point of the segments (a0, a1) and (b0, b1), or
/// None if they don't meet. Touching segments intersect. For collinear
/// overlapping segments one of the shared points is returned.
pub fn segment_intersection(
    a0: Point,
    a1: Point,
    b0: Point,
    b1: Point,
) -> Option<Point> {
    let r = a1.sub(a0);
    let s = b1.sub(b0);
    let denom = r.cross(s);
    let qp = b0.sub(a0);
    let eps = 1e-12 * (1. + r.length() * s.length());

    if denom.abs() <= eps {
        // Parallel. Check for collinear overlap.
        if qp.cross(r).abs() > eps {
            return None;
        }
        let rr = r.dot(r);
        if rr == 0. {
            // The first segment is a point.
            return if point_segment_distance(a0, b0, b1) <= 1e-12 {
                Some(a0)
            } else {
                None
            };
        }
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let lo = t0.min(t1).max(0.);
        let hi = t0.max(t1).min(1.);
        if lo > hi {
            return None;
        }
        return Some(a0.add(r.scale(lo)));
    }

    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    let tol = 1e-12;
    if t < -tol || t > 1. + tol || u < -tol || u > 1. + tol {
        return None;
    }
    Some(a0.add(r.scale(t)))
}

/// \returns True if the segments cross at a point that is interior to both
/// of them (not at an endpoint, up to \p eps).
pub fn segments_cross_properly(
    a0: Point,
    a1: Point,
    b0: Point,
    b1: Point,
    eps: f64,
) -> bool {
    let r = a1.sub(a0);
    let s = b1.sub(b0);
    let d1 = r.cross(b0.sub(a0));
    let d2 = r.cross(b1.sub(a0));
    let d3 = s.cross(a0.sub(b0));
    let d4 = s.cross(a1.sub(b0));
    let lr = r.length().max(1e-12);
    let ls = s.length().max(1e-12);
    // Normalize the orientation tests to distances from the lines.
    let (d1, d2) = (d1 / lr, d2 / lr);
    let (d3, d4) = (d3 / ls, d4 / ls);
    ((d1 > eps && d2 < -eps) || (d1 < -eps && d2 > eps))
        && ((d3 > eps && d4 < -eps) || (d3 < -eps && d4 > eps))
}

/// \returns the distance between the point \p p and the segment (a, b).
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 == 0. {
        return p.distance_to(a);
    }
    let t = (p.sub(a).dot(ab) / len2).max(0.).min(1.);
    p.distance_to(a.add(ab.scale(t)))
}

/// \returns the minimal distance between the segments (a0, a1) and (b0, b1).
/// In the plane the minimum is zero if the segments intersect, and otherwise
/// is attained at one of the four endpoints.
pub fn segment_segment_distance(a0: Point, a1: Point, b0: Point, b1: Point) -> f64 {
    if segment_intersection(a0, a1, b0, b1).is_some() {
        return 0.;
    }
    point_segment_distance(a0, b0, b1)
        .min(point_segment_distance(a1, b0, b1))
        .min(point_segment_distance(b0, a0, a1))
        .min(point_segment_distance(b1, a0, a1))
}

#[cfg(test)]
fn brute_force_distance(a0: Point, a1: Point, b0: Point, b1: Point, n: usize) -> f64 {
    let mut best = f64::INFINITY;
    for i in 0..n {
        let p = a0.add(a1.sub(a0).scale(i as f64 / (n - 1) as f64));
        for j in 0..n {
            let q = b0.add(b1.sub(b0).scale(j as f64 / (n - 1) as f64));
            best = best.min(p.distance_to(q));
        }
    }
    best
}

#[test]
fn segment_distance_cases() {
    let n = 401;
    let cases = [
        // Parallel.
        (
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(2., 3.),
            Point::new(8., 3.),
        ),
        // Collinear and overlapping.
        (
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(5., 0.),
            Point::new(15., 0.),
        ),
        // Collinear and disjoint.
        (
            Point::new(0., 0.),
            Point::new(10., 0.),
            Point::new(12., 0.),
            Point::new(15., 0.),
        ),
        // Skew, not crossing.
        (
            Point::new(0., 0.),
            Point::new(4., 4.),
            Point::new(6., 0.),
            Point::new(9., -5.),
        ),
        // Crossing.
        (
            Point::new(0., 0.),
            Point::new(4., 4.),
            Point::new(0., 4.),
            Point::new(4., 0.),
        ),
    ];
    for (a0, a1, b0, b1) in cases.iter() {
        let exact = segment_segment_distance(*a0, *a1, *b0, *b1);
        let brute = brute_force_distance(*a0, *a1, *b0, *b1, n);
        let step = (a0.distance_to(*a1) + b0.distance_to(*b1)) / (n - 1) as f64;
        assert!(brute >= exact - 1e-9);
        assert!(brute - exact <= step, "{} vs {}", exact, brute);
    }
    assert_eq!(
        segment_segment_distance(cases[0].0, cases[0].1, cases[0].2, cases[0].3),
        3.
    );
    assert_eq!(
        segment_segment_distance(cases[2].0, cases[2].1, cases[2].2, cases[2].3),
        2.
    );
}

#[test]
fn segment_intersection_test() {
    let p = segment_intersection(
        Point::new(0., 0.),
        Point::new(4., 4.),
        Point::new(0., 4.),
        Point::new(4., 0.),
    );
    assert!(p.unwrap().is_close_to(Point::new(2., 2.), 1e-9));
    assert!(segment_intersection(
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(0., 1.),
        Point::new(1., 1.),
    )
    .is_none());
    // Touching at an endpoint is not a proper crossing.
    assert!(!segments_cross_properly(
        Point::new(0., 0.),
        Point::new(2., 0.),
        Point::new(2., 0.),
        Point::new(3., 3.),
        1e-9,
    ));
    assert!(segments_cross_properly(
        Point::new(0., 0.),
        Point::new(2., 2.),
        Point::new(0., 2.),
        Point::new(2., 0.),
        1e-9,
    ));
}

#[test]
fn curve_test() {
    let mut c = Curve::from_polyline(&[
        Point::new(0., 0.),
        Point::new(10., 0.),
        Point::new(10., 10.),
    ]);
    c.add_segment(Segment::bezier(
        Point::new(10., 10.),
        Point::new(10., 15.),
        Point::new(15., 20.),
        Point::new(20., 20.),
    ));
    assert_eq!(c.len(), 3);
    assert_eq!(c.start(), Some(Point::new(0., 0.)));
    assert_eq!(c.end(), Some(Point::new(20., 20.)));
    let bb = c.bounding_box();
    assert_eq!(bb.max, Point::new(20., 20.));
    let arc = Segment::Arc(EllipseArc {
        center: Point::zero(),
        axis_a: Point::new(1., 0.),
        axis_b: Point::new(0., 1.),
        start_angle: 0.,
        end_angle: std::f64::consts::PI,
    });
    assert!(arc.end().is_close_to(Point::new(-1., 0.), 1e-9));
    assert!((arc.length() - std::f64::consts::PI).abs() < 0.01);
    assert!(arc.reversed().start().is_close_to(Point::new(-1., 0.), 1e-9));
    let d = arc.derivative_at(0.);
    assert!(d.is_close_to(Point::new(0., std::f64::consts::PI), 1e-9));
}

#[test]
fn nearest_point_test() {
    let c = Curve::from_polyline(&[
        Point::new(0., 0.),
        Point::new(10., 0.),
        Point::new(10., 10.),
    ]);
    let p = c.nearest_point(Point::new(4., -3.), 4).unwrap();
    assert!(p.is_close_to(Point::new(4., 0.), 1e-9));
    let p = c.nearest_point(Point::new(15., 7.), 4).unwrap();
    assert!(p.is_close_to(Point::new(10., 7.), 1e-9));
    // Points past the ends snap to the ends.
    let p = c.nearest_point(Point::new(-5., -5.), 4).unwrap();
    assert!(p.is_close_to(Point::zero(), 1e-9));
    assert!(Curve::new().nearest_point(Point::zero(), 4).is_none());
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// The closed form distance must never exceed a sampled distance, and
    /// must be within one sampling step of it.
    fn check_distance_matches_sampling(
        a0: Point,
        a1: Point,
        b0: Point,
        b1: Point,
    ) -> Result<(), TestCaseError> {
        let n = 120;
        let exact = segment_segment_distance(a0, a1, b0, b1);
        let brute = brute_force_distance(a0, a1, b0, b1, n);
        let step = (a0.distance_to(a1) + b0.distance_to(b1)) / (n - 1) as f64;
        prop_assert!(exact >= 0.);
        prop_assert!(brute >= exact - 1e-9);
        prop_assert!(brute - exact <= step + 1e-9);
        Ok(())
    }

    /// A parallel copy of a segment is exactly the offset away.
    fn check_parallel_offset(a0: Point, a1: Point, offset: f64) -> Result<(), TestCaseError> {
        let dir = a1.sub(a0);
        prop_assume!(dir.length() > 1e-3);
        let normal = dir.perpendicular().scale(offset / dir.length());
        let d = segment_segment_distance(a0, a1, a0.add(normal), a1.add(normal));
        prop_assert!((d - offset).abs() < 1e-6 * (1. + offset));
        Ok(())
    }

    proptest! {
        #[test]
        fn distance_matches_sampling(
            a0 in point_strategy(),
            a1 in point_strategy(),
            b0 in point_strategy(),
            b1 in point_strategy(),
        ) {
            check_distance_matches_sampling(a0, a1, b0, b1)?;
        }

        #[test]
        fn parallel_offset(a0 in point_strategy(), a1 in point_strategy(), offset in 0.0f64..50.0) {
            check_parallel_offset(a0, a1, offset)?;
        }
    }
}
