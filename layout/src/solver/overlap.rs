//! Removal of overlaps between rectangles with the projection solver. The
//! rectangles are first separated horizontally, then the pairs that still
//! overlap are separated vertically. Each axis uses a fresh solver, and the
//! rectangles move as little as possible.

use super::projection::Solver;
use crate::core::error::Result;
use crate::core::geometry::{Interval, Point, Rectangle};

const OVERLAP_EPSILON: f64 = 1e-7;

/// \returns the depth of the overlap of two intervals, padded by \p padding,
/// or a non-positive number if they don't overlap.
fn overlap_depth(a: Interval, b: Interval, padding: f64) -> f64 {
    a.end.min(b.end) - a.start.max(b.start) + padding
}

/// Move the rectangles \p rects so that no two of them are closer than
/// \p padding to each other. \returns the moved rectangles.
pub fn remove_overlaps(rects: &[Rectangle], padding: f64) -> Result<Vec<Rectangle>> {
    let n = rects.len();
    let mut res = rects.to_vec();
    if n < 2 {
        return Ok(res);
    }

    // Separate along x every pair that overlaps in y, unless the pair
    // overlaps and is cheaper to separate along y.
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = (&res[i], &res[j]);
            let dy = overlap_depth(a.y_interval(), b.y_interval(), padding);
            if dy <= OVERLAP_EPSILON {
                continue;
            }
            let dx = overlap_depth(a.x_interval(), b.x_interval(), padding);
            if dx > OVERLAP_EPSILON && dx > dy {
                continue;
            }
            pairs.push((i, j));
        }
    }
    let xs = separate(&res, &pairs, padding, true)?;
    for (r, x) in res.iter_mut().zip(xs) {
        *r = r.translate(Point::new(x - r.center().x, 0.));
    }

    // Separate along y every pair that still overlaps in x.
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let (a, b) = (&res[i], &res[j]);
            let dx = overlap_depth(a.x_interval(), b.x_interval(), padding);
            if dx > OVERLAP_EPSILON {
                pairs.push((i, j));
            }
        }
    }
    let ys = separate(&res, &pairs, padding, false)?;
    for (r, y) in res.iter_mut().zip(ys) {
        *r = r.translate(Point::new(0., y - r.center().y));
    }

    #[cfg(feature = "log")]
    log::debug!("Removed the overlaps of {} rectangles.", n);
    Ok(res)
}

/// Solve for the centers along one axis, with a separation constraint for
/// each pair in \p pairs. Pairs are ordered by their current centers.
fn separate(
    rects: &[Rectangle],
    pairs: &[(usize, usize)],
    padding: f64,
    along_x: bool,
) -> Result<Vec<f64>> {
    let center = |r: &Rectangle| if along_x { r.center().x } else { r.center().y };
    let extent = |r: &Rectangle| if along_x { r.width() } else { r.height() };

    let mut solver = Solver::new();
    let mut vars = Vec::with_capacity(rects.len());
    for r in rects {
        vars.push(solver.add_variable(center(r), 1.)?);
    }
    for (i, j) in pairs {
        let (ci, cj) = (center(&rects[*i]), center(&rects[*j]));
        let (left, right) = if ci < cj || (ci == cj && i < j) {
            (*i, *j)
        } else {
            (*j, *i)
        };
        let gap = (extent(&rects[left]) + extent(&rects[right])) / 2. + padding;
        solver.add_constraint(vars[left], vars[right], gap, false)?;
    }
    solver.solve()?;
    Ok(solver.positions())
}

#[cfg(test)]
fn assert_no_overlaps(rects: &[Rectangle], padding: f64) {
    for i in 0..rects.len() {
        for j in i + 1..rects.len() {
            let dx = overlap_depth(rects[i].x_interval(), rects[j].x_interval(), padding);
            let dy = overlap_depth(rects[i].y_interval(), rects[j].y_interval(), padding);
            assert!(
                dx <= 1e-6 || dy <= 1e-6,
                "{} overlaps {}",
                rects[i],
                rects[j]
            );
        }
    }
}

#[test]
fn test_remove_overlaps() {
    use crate::core::utils::PseudoRandom;

    let mut rnd = PseudoRandom::new(17);
    let mut rects = Vec::new();
    for _ in 0..40 {
        let c = Point::new(rnd.next_f64() * 200., rnd.next_f64() * 200.);
        let sz = Point::new(10. + rnd.next_f64() * 30., 10. + rnd.next_f64() * 20.);
        rects.push(Rectangle::from_center(c, sz));
    }
    let res = remove_overlaps(&rects, 4.).unwrap();
    assert_eq!(res.len(), rects.len());
    assert_no_overlaps(&res, 4.);
    // The sizes don't change.
    for (a, b) in rects.iter().zip(res.iter()) {
        assert!((a.width() - b.width()).abs() < 1e-9);
        assert!((a.height() - b.height()).abs() < 1e-9);
    }
}

#[test]
fn test_no_overlaps_no_moves() {
    let rects = vec![
        Rectangle::from_center(Point::new(0., 0.), Point::splat(10.)),
        Rectangle::from_center(Point::new(20., 0.), Point::splat(10.)),
        Rectangle::from_center(Point::new(0., 20.), Point::splat(10.)),
    ];
    let res = remove_overlaps(&rects, 2.).unwrap();
    assert_eq!(res, rects);

    // Two boxes on top of each other.
    let rects = vec![
        Rectangle::from_center(Point::new(0., 0.), Point::new(10., 4.)),
        Rectangle::from_center(Point::new(1., 0.), Point::new(10., 4.)),
    ];
    let res = remove_overlaps(&rects, 0.).unwrap();
    assert_no_overlaps(&res, 0.);
}
