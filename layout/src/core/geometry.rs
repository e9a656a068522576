//! Contains functions that are related to the geometry of shapes and their
//! interaction. This includes points, intervals, rectangles, the clipping of
//! edges against node boundaries and convex hulls.

// Stores a 2D coordinate, or a vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn zero() -> Point {
        Self { x: 0., y: 0. }
    }

    pub fn new(x: f64, y: f64) -> Point {
        Self { x, y }
    }

    pub fn splat(s: f64) -> Point {
        Point::new(s, s)
    }

    pub fn neg(&self) -> Point {
        Point::new(-self.x, -self.y)
    }

    pub fn add(&self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: Point) -> Point {
        self.add(other.neg())
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3d cross product. Positive when \p other is
    /// counter-clockwise from self.
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let d = self.sub(other);
        (d.x * d.x + d.y * d.y).sqrt()
    }

    pub fn length(&self) -> f64 {
        Point::zero().distance_to(*self)
    }

    pub fn scale(&self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }

    pub fn transpose(&self) -> Point {
        Point::new(self.y, self.x)
    }

    /// \returns the vector rotated by 90 degrees counter-clockwise.
    pub fn perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn midpoint(&self, other: Point) -> Point {
        self.add(other).scale(0.5)
    }

    pub fn rotate_around(&self, center: Point, angle: f64) -> Point {
        let normalized = self.sub(center);
        let rotated = normalized.rotate(angle);
        rotated.add(center)
    }
    pub fn rotate(&self, angle: f64) -> Point {
        let x = self.x;
        let y = self.y;
        Point::new(
            x * angle.cos() - y * angle.sin(),
            x * angle.sin() + y * angle.cos(),
        )
    }

    pub fn is_close_to(&self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(x: {:.3}, y: {:.3})", self.x, self.y)
    }
}

/// A closed range of real numbers [start, end].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Create the interval between \p a and \p b, in any order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// \returns the smallest interval that contains both \p a and \p b.
    pub fn merge(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.start.min(b.start), a.end.max(b.end))
    }

    pub fn contains(&self, x: f64) -> bool {
        in_range((self.start, self.end), x)
    }

    /// Clamp \p x into the interval.
    pub fn clamped_to(&self, x: f64) -> f64 {
        x.max(self.start).min(self.end)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn middle(&self) -> f64 {
        (self.start + self.end) / 2.
    }

    pub fn intersects(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Grow the interval on both sides by \p d.
    pub fn pad(&self, d: f64) -> Interval {
        Interval::new(self.start - d, self.end + d)
    }
}

/// An axis aligned rectangle. The y axis grows downwards, so \p min is the
/// top-left corner and \p max is the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub min: Point,
    pub max: Point,
}

impl Rectangle {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_center(center: Point, size: Point) -> Self {
        let half = size.scale(0.5);
        Self::new(center.sub(half), center.add(half))
    }

    /// An empty rectangle that any union turns into the other operand.
    pub fn empty() -> Self {
        Self {
            min: Point::splat(f64::INFINITY),
            max: Point::splat(f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(self.max)
    }
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }
    pub fn left(&self) -> f64 {
        self.min.x
    }
    pub fn right(&self) -> f64 {
        self.max.x
    }
    pub fn top(&self) -> f64 {
        self.min.y
    }
    pub fn bottom(&self) -> f64 {
        self.max.y
    }

    pub fn x_interval(&self) -> Interval {
        Interval::new(self.min.x, self.max.x)
    }
    pub fn y_interval(&self) -> Interval {
        Interval::new(self.min.y, self.max.y)
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn add_point(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y));
    }

    /// Grow the rectangle by \p d on all sides.
    pub fn pad(&self, d: f64) -> Rectangle {
        Rectangle::new(self.min.sub(Point::splat(d)), self.max.add(Point::splat(d)))
    }

    pub fn translate(&self, d: Point) -> Rectangle {
        Rectangle::new(self.min.add(d), self.max.add(d))
    }

    /// \returns True if \p p is inside the rectangle or on its boundary.
    pub fn contains(&self, p: Point) -> bool {
        self.x_interval().contains(p.x) && self.y_interval().contains(p.y)
    }

    /// \returns True if \p p is strictly inside the rectangle.
    pub fn contains_strict(&self, p: Point, eps: f64) -> bool {
        p.x > self.min.x + eps
            && p.x < self.max.x - eps
            && p.y > self.min.y + eps
            && p.y < self.max.y - eps
    }

    /// \return True if the boxes intersect (touching counts).
    pub fn intersects(&self, other: &Rectangle) -> bool {
        do_boxes_intersect((self.min, self.max), (other.min, other.max))
    }

    /// The corners, in counter-clockwise order (with respect to the sign of
    /// Point::cross).
    pub fn corners(&self) -> Vec<Point> {
        vec![
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    pub fn transpose(&self) -> Rectangle {
        Rectangle::new(self.min.transpose(), self.max.transpose())
    }
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "center {} size ({:.3} x {:.3})",
            self.center(),
            self.width(),
            self.height()
        )
    }
}

/// \returns the intersection point for a line with slope \p m with an ellipse
/// with the formula. 1 = (x^2 / a^2) + (y^2 / b^2).
/// Replace Y with the line equation and isolate x and solve to get the
/// intersection point with the ellipse.
/// Notice that a line has two intersection points with a circle, so users need
/// to figure out which of the two values (+X, +Y) or (-X, -Y) is relevant.
pub fn ellipse_line_intersection(a: f64, b: f64, m: f64) -> Point {
    let x: f64 = ((a * a * b * b) / (b * b + a * a * m * m)).sqrt();
    let y: f64 = m * x;
    Point::new(x, y)
}

/// \returns the point where the ray from \p center toward \p toward leaves
/// the ellipse of size \p size.
pub fn clip_to_ellipse(center: Point, size: Point, toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;

    let a = size.x / 2.;
    let b = size.y / 2.;

    if dx == 0. {
        if dy == 0. {
            return center;
        }
        return Point::new(center.x, center.y + b * dy.signum());
    }

    let m = dy / dx;
    let mut v = ellipse_line_intersection(a, b, m);

    // The intersection formula gives two solutions (for the sqrt). Figure out
    // which solution is needed depending on the direction of the ray (dx).
    if dx < 0. {
        v = v.neg();
    }
    center.add(v)
}

/// \returns the point where the ray from \p center toward \p toward leaves
/// the box of size \p size. If \p toward is inside the box then the ray is
/// clipped at \p toward.
pub fn clip_to_box(center: Point, size: Point, toward: Point) -> Point {
    let d = toward.sub(center);
    if d.x == 0. && d.y == 0. {
        return center;
    }

    let half = size.scale(0.5);
    let tx = if d.x != 0. {
        half.x / d.x.abs()
    } else {
        f64::INFINITY
    };
    let ty = if d.y != 0. {
        half.y / d.y.abs()
    } else {
        f64::INFINITY
    };
    let t = tx.min(ty).min(1.);
    center.add(d.scale(t))
}

/// Perform linear interpolation of the vectors v0 and v1, using the
/// ratio w which is assumed to be between 0..1.
pub fn interpolate(v0: Point, v1: Point, w: f64) -> Point {
    v0.scale(w).add(v1.scale(1. - w))
}

/// \return true if \p x is in the inclusive range P.x .. P.y.
pub fn in_range(range: (f64, f64), x: f64) -> bool {
    x >= range.0 && x <= range.1
}

/// trivial function for checking aproximate equality of f64, within epsion of f64
fn approx_eq_f64(x: f64, y: f64) -> bool {
    if x == 0. {
        y.abs() < f64::EPSILON
    } else if y == 0. {
        x.abs() < f64::EPSILON
    } else {
        let abs_diff = (x - y).abs();
        if abs_diff < f64::EPSILON {
            true
        } else {
            abs_diff / x.abs().max(y.abs()) < f64::EPSILON
        }
    }
}

/// Similar to usual smaller than or equal to op, except for equal is withint f64 epsilon
fn smaller_than_or_equal_to_f64(x: f64, y: f64) -> bool {
    x < y || approx_eq_f64(x, y)
}

/// \return True if the boxes (defined by the bounding box) intersect.
pub fn do_boxes_intersect(p1: (Point, Point), p2: (Point, Point)) -> bool {
    let overlap_x = smaller_than_or_equal_to_f64(p2.0.x, p1.1.x)
        && smaller_than_or_equal_to_f64(p1.0.x, p2.1.x);
    let overlap_y = smaller_than_or_equal_to_f64(p2.0.y, p1.1.y)
        && smaller_than_or_equal_to_f64(p1.0.y, p2.1.y);
    overlap_x && overlap_y
}

/// Return the weighted median for \p vec.
/// This is the method that's described in
/// "DAG - A Program that Draws Directed Graphs"
/// Gansner, North, Vo 1989. Pg 10.
pub fn weighted_median(vec: &[f64]) -> f64 {
    assert!(!vec.is_empty(), "array can't be empty");

    let mut vec = vec.to_vec();
    vec.sort_by(|a, b| a.total_cmp(b));

    if vec.len() == 1 {
        return vec[0];
    }

    if vec.len() == 2 {
        return (vec[0] + vec[1]) / 2.;
    }
    let mid = vec.len() / 2;

    if vec.len() % 2 == 1 {
        return vec[mid];
    }

    (vec[mid] + vec[mid - 1]) / 2.
}

/// \return True if the segment intersects the rect.
pub fn segment_rect_intersection(
    seg: (Point, Point),
    rect: (Point, Point),
) -> bool {
    // Check that the rect is normalized.
    assert!(rect.0.x <= rect.1.x);
    assert!(rect.0.y <= rect.1.y);

    // Check the case of vertical segment:
    if seg.0.x == seg.1.x {
        let in_x = seg.1.x >= rect.0.x && seg.1.x <= rect.1.x;
        let lo = seg.0.y.min(seg.1.y);
        let hi = seg.0.y.max(seg.1.y);
        return in_x && lo <= rect.1.y && hi >= rect.0.y;
    }

    // Check if the lines are outside of the x range.
    let above = seg.0.x < rect.0.x && seg.1.x < rect.0.x;
    let below = seg.0.x > rect.1.x && seg.1.x > rect.1.x;
    if above || below {
        return false;
    }

    // Check if the lines are outside of the y range.
    let above = seg.0.y < rect.0.y && seg.1.y < rect.0.y;
    let below = seg.0.y > rect.1.y && seg.1.y > rect.1.y;
    if above || below {
        return false;
    }

    // Find the intersection point with the edge of the box.
    //    | o
    //    |/
    //    o  <----- y
    //   /|
    //  / |
    // o  x
    let dx = seg.1.x - seg.0.x; // Can't be zero.
    let dy = seg.1.y - seg.0.y;
    let a = dy / dx;
    // y = a x + b
    // b = y - a * x;
    let b = seg.0.y - a * seg.0.x;

    // Intersect the segment with the two vertical lines of the box, limited to
    // the x range of the segment.
    let x0 = rect.0.x.max(seg.0.x.min(seg.1.x));
    let x1 = rect.1.x.min(seg.0.x.max(seg.1.x));
    let y0 = a * x0 + b;
    let y1 = a * x1 + b;

    // There is no intersection if both hits are on the same side of the box.
    let above = y0 < rect.0.y && y1 < rect.0.y;
    let below = y0 > rect.1.y && y1 > rect.1.y;
    !(above || below)
}

/// Computes the convex hull of \p points with the monotone chain algorithm.
/// The result is in counter-clockwise order (positive Point::cross turns)
/// and contains no collinear points.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.is_close_to(*b, 1e-12));
    if pts.len() < 3 {
        return pts;
    }

    fn turn(o: Point, a: Point, b: Point) -> f64 {
        a.sub(o).cross(b.sub(o))
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    // Lower chain.
    for p in pts.iter() {
        while hull.len() >= 2
            && turn(hull[hull.len() - 2], hull[hull.len() - 1], *p) <= 0.
        {
            hull.pop();
        }
        hull.push(*p);
    }
    // Upper chain.
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && turn(hull[hull.len() - 2], hull[hull.len() - 1], *p) <= 0.
        {
            hull.pop();
        }
        hull.push(*p);
    }
    // The last point is the first point.
    hull.pop();
    hull
}

/// Approximate the ellipse with \p n points, in counter-clockwise order.
pub fn ellipse_points(center: Point, size: Point, n: usize) -> Vec<Point> {
    let a = size.x / 2.;
    let b = size.y / 2.;
    (0..n)
        .map(|i| {
            let t = (i as f64) * std::f64::consts::TAU / (n as f64);
            Point::new(center.x + a * t.cos(), center.y + b * t.sin())
        })
        .collect()
}

#[test]
fn segment_rect_intersection_test() {
    // Check intersection:
    let v0 = (
        Point::new(-48., -27.),
        Point::new(-196., -55.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    let v1 = (
        Point::new(-70., -156.),
        Point::new(57., 41.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    let v2 = (
        Point::new(70., -11.),
        Point::new(-20., -119.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    assert!(segment_rect_intersection((v0.0, v0.1), (v0.2, v0.3)));
    assert!(segment_rect_intersection((v1.0, v1.1), (v1.2, v1.3)));
    assert!(segment_rect_intersection((v2.0, v2.1), (v2.2, v2.3)));

    // Check no intersection:
    let v0 = (
        Point::new(190., -55.),
        Point::new(173., 199.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    let v1 = (
        Point::new(142., -19.),
        Point::new(-108., -133.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    let v2 = (
        Point::new(151., 80.),
        Point::new(17., 124.),
        Point::new(-50., -50.),
        Point::new(50., 50.),
    );
    assert!(!segment_rect_intersection((v0.0, v0.1), (v0.2, v0.3)));
    assert!(!segment_rect_intersection((v1.0, v1.1), (v1.2, v1.3)));
    assert!(!segment_rect_intersection((v2.0, v2.1), (v2.2, v2.3)));
}

#[test]
fn interval_test() {
    let a = Interval::new(0., 1.);
    let b = Interval::new(1., 2.);
    let m = Interval::merge(&a, &b);
    assert_eq!(m.start, 0.);
    assert_eq!(m.end, 2.);
    assert_eq!(b.clamped_to(2.1), 2.);
    assert_eq!(b.clamped_to(0.3), 1.);
    assert!(a.contains(0.) && a.contains(1.) && !a.contains(1.0001));
    assert!(a.intersects(&b));
    assert_eq!(Interval::new(3., -1.).start, -1.);
}

#[test]
fn clip_test() {
    let c = Point::new(10., 10.);
    let sz = Point::new(20., 10.);
    let p = clip_to_box(c, sz, Point::new(100., 10.));
    assert!(p.is_close_to(Point::new(20., 10.), 1e-9));
    let p = clip_to_box(c, sz, Point::new(10., -100.));
    assert!(p.is_close_to(Point::new(10., 5.), 1e-9));
    let p = clip_to_ellipse(c, sz, Point::new(-100., 10.));
    assert!(p.is_close_to(Point::new(0., 10.), 1e-9));
    let p = clip_to_ellipse(c, sz, Point::new(10., 100.));
    assert!(p.is_close_to(Point::new(10., 15.), 1e-9));
}

#[test]
fn hull_test() {
    let pts = vec![
        Point::new(0., 0.),
        Point::new(2., 0.),
        Point::new(1., 0.),
        Point::new(2., 2.),
        Point::new(0., 2.),
        Point::new(1., 1.),
    ];
    let hull = convex_hull(&pts);
    assert_eq!(hull.len(), 4);
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let c = hull[(i + 2) % hull.len()];
        assert!(b.sub(a).cross(c.sub(b)) > 0.);
    }
}

#[test]
fn rectangle_test() {
    let r = Rectangle::from_center(Point::new(5., 5.), Point::new(10., 4.));
    assert_eq!(r.left(), 0.);
    assert_eq!(r.bottom(), 7.);
    let u = r.union(&Rectangle::from_center(Point::zero(), Point::splat(2.)));
    assert_eq!(u.min, Point::new(-1., -1.));
    assert!(r.contains(Point::new(0., 3.)));
    assert!(!r.contains_strict(Point::new(0., 3.), 0.));
    assert!(Rectangle::empty().is_empty());
}
