//! Orthogonal edge routing. The routes run on the grid that the sides of the
//! (padded) node boxes and the port coordinates span. Each grid segment
//! records the boxes that cover it, so one grid serves all of the edges: a
//! route may use a segment if it's covered only by the boxes of its own
//! endpoints. The search runs over (grid point, direction) states, which
//! lets it charge a penalty for every bend.

use super::shortest_path::dijkstra;
use crate::core::geometry::{Point, Rectangle};

const HORIZONTAL: usize = 0;
const VERTICAL: usize = 1;

#[derive(Debug, Clone)]
pub struct RectilinearGrid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// The boxes that cover the segment from (i, j) to (i + 1, j).
    h_cover: Vec<Vec<usize>>,
    /// The boxes that cover the segment from (i, j) to (i, j + 1).
    v_cover: Vec<Vec<usize>>,
}

fn sorted_unique(mut v: Vec<f64>) -> Vec<f64> {
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup();
    v
}

/// \returns the range of indices of the values in the sorted list \p v that
/// are strictly between \p lo and \p hi.
fn strictly_inside(v: &[f64], lo: f64, hi: f64) -> std::ops::Range<usize> {
    let start = v.partition_point(|x| *x <= lo);
    let end = v.partition_point(|x| *x < hi);
    start..end.max(start)
}

/// \returns the range of indices of the values in \p v within [lo, hi].
fn inside(v: &[f64], lo: f64, hi: f64) -> std::ops::Range<usize> {
    let start = v.partition_point(|x| *x < lo);
    let end = v.partition_point(|x| *x <= hi);
    start..end.max(start)
}

impl RectilinearGrid {
    /// Build the grid of the obstacles \p boxes and the route endpoints
    /// \p ports.
    pub fn new(boxes: &[Rectangle], ports: &[Point]) -> Self {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for b in boxes {
            xs.push(b.left());
            xs.push(b.right());
            ys.push(b.top());
            ys.push(b.bottom());
        }
        for p in ports {
            xs.push(p.x);
            ys.push(p.y);
        }
        let xs = sorted_unique(xs);
        let ys = sorted_unique(ys);
        let num_points = xs.len() * ys.len();
        let mut grid = Self {
            xs,
            ys,
            h_cover: vec![Vec::new(); num_points],
            v_cover: vec![Vec::new(); num_points],
        };

        for (idx, b) in boxes.iter().enumerate() {
            // Horizontal segments on the grid lines strictly inside the box,
            // between the sides of the box.
            let cols = inside(&grid.xs, b.left(), b.right());
            for j in strictly_inside(&grid.ys, b.top(), b.bottom()) {
                for i in cols.start..cols.end.saturating_sub(1) {
                    let id = grid.index(i, j);
                    grid.h_cover[id].push(idx);
                }
            }
            let rows = inside(&grid.ys, b.top(), b.bottom());
            for i in strictly_inside(&grid.xs, b.left(), b.right()) {
                for j in rows.start..rows.end.saturating_sub(1) {
                    let id = grid.index(i, j);
                    grid.v_cover[id].push(idx);
                }
            }
        }
        grid
    }

    fn index(&self, i: usize, j: usize) -> usize {
        j * self.xs.len() + i
    }

    fn coords(&self, id: usize) -> (usize, usize) {
        (id % self.xs.len(), id / self.xs.len())
    }

    pub fn num_points(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    /// \returns the grid point at \p p, if \p p is on the grid.
    pub fn locate(&self, p: Point) -> Option<usize> {
        let i = self.xs.binary_search_by(|x| x.total_cmp(&p.x)).ok()?;
        let j = self.ys.binary_search_by(|y| y.total_cmp(&p.y)).ok()?;
        Some(self.index(i, j))
    }

    pub fn point(&self, id: usize) -> Point {
        let (i, j) = self.coords(id);
        Point::new(self.xs[i], self.ys[j])
    }

    /// Find an orthogonal route from \p source to \p target. Each end is a
    /// grid point and the index of the box it leaves from, and the segments
    /// covered by these two boxes are allowed. Each bend costs
    /// \p bend_penalty.
    /// \returns the corners of the route, including the two ends.
    pub fn route(
        &self,
        source: (Point, usize),
        target: (Point, usize),
        bend_penalty: f64,
    ) -> Option<Vec<Point>> {
        let s = self.locate(source.0)?;
        let t = self.locate(target.0)?;
        if s == t {
            return Some(vec![source.0, target.0]);
        }
        let allowed = |cover: &[usize]| cover.iter().all(|b| *b == source.1 || *b == target.1);

        // Two states per grid point, and virtual start and end states.
        let n = self.num_points();
        let start = 2 * n;
        let end = 2 * n + 1;
        let neighbors = |state: usize| {
            let mut res = Vec::with_capacity(4);
            if state == start {
                res.push((2 * s + HORIZONTAL, 0.));
                res.push((2 * s + VERTICAL, 0.));
                return res;
            }
            if state == end {
                return res;
            }
            let id = state / 2;
            let dir = state % 2;
            if id == t {
                res.push((end, 0.));
            }
            let (i, j) = self.coords(id);
            let turn = |d: usize| if d == dir { 0. } else { bend_penalty };
            if i + 1 < self.xs.len() && allowed(&self.h_cover[id]) {
                let cost = self.xs[i + 1] - self.xs[i] + turn(HORIZONTAL);
                res.push((2 * self.index(i + 1, j) + HORIZONTAL, cost));
            }
            if i > 0 && allowed(&self.h_cover[self.index(i - 1, j)]) {
                let cost = self.xs[i] - self.xs[i - 1] + turn(HORIZONTAL);
                res.push((2 * self.index(i - 1, j) + HORIZONTAL, cost));
            }
            if j + 1 < self.ys.len() && allowed(&self.v_cover[id]) {
                let cost = self.ys[j + 1] - self.ys[j] + turn(VERTICAL);
                res.push((2 * self.index(i, j + 1) + VERTICAL, cost));
            }
            if j > 0 && allowed(&self.v_cover[self.index(i, j - 1)]) {
                let cost = self.ys[j] - self.ys[j - 1] + turn(VERTICAL);
                res.push((2 * self.index(i, j - 1) + VERTICAL, cost));
            }
            res
        };

        let path = dijkstra(2 * n + 2, start, end, neighbors)?;
        let mut points: Vec<Point> = Vec::new();
        for state in path.iter() {
            if *state >= start {
                continue;
            }
            let p = self.point(state / 2);
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        Some(remove_straight_points(&points))
    }
}

/// \returns the polyline \p points without the points in the middle of
/// straight runs.
pub fn remove_straight_points(points: &[Point]) -> Vec<Point> {
    let mut res: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if res.len() >= 2 {
            let a = res[res.len() - 2];
            let b = res[res.len() - 1];
            if (a.x == b.x && b.x == p.x) || (a.y == b.y && b.y == p.y) {
                res.pop();
            }
        }
        res.push(*p);
    }
    res
}

#[test]
fn test_rectilinear_route() {
    let boxes = vec![
        Rectangle::new(Point::new(0., 0.), Point::new(10., 10.)),
        Rectangle::new(Point::new(100., 0.), Point::new(110., 10.)),
        // A wall between the two nodes.
        Rectangle::new(Point::new(40., -30.), Point::new(60., 20.)),
    ];
    let ports: Vec<Point> = boxes[..2].iter().map(|b| b.center()).collect();
    let grid = RectilinearGrid::new(&boxes, &ports);

    let route = grid.route((ports[0], 0), (ports[1], 1), 10.).unwrap();
    assert_eq!(route.first(), Some(&ports[0]));
    assert_eq!(route.last(), Some(&ports[1]));
    for w in route.windows(2) {
        // All of the segments are axis aligned.
        assert!(w[0].x == w[1].x || w[0].y == w[1].y);
        // And they don't go through the wall.
        let mid = w[0].midpoint(w[1]);
        assert!(!boxes[2].contains_strict(mid, 1e-9));
    }
    // Down around the wall (the shorter way), with two bends.
    assert_eq!(route.len(), 4);
    assert!(route.iter().any(|p| p.y == 20.));

    // Without the wall the route is a straight line.
    let grid = RectilinearGrid::new(&boxes[..2], &ports);
    let route = grid.route((ports[0], 0), (ports[1], 1), 10.).unwrap();
    assert_eq!(route, vec![ports[0], ports[1]]);
}

#[test]
fn test_remove_straight_points() {
    let pts = vec![
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(2., 0.),
        Point::new(2., 3.),
        Point::new(2., 4.),
    ];
    assert_eq!(
        remove_straight_points(&pts),
        vec![Point::new(0., 0.), Point::new(2., 0.), Point::new(2., 4.)]
    );
}
