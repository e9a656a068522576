//! Multidimensional scaling layout. The graph distance between two nodes is
//! the number of hops between them, times the ideal edge length. Classical
//! MDS finds the 2D positions whose distances best match the graph distances,
//! from the two leading eigenvectors of the double centered matrix of squared
//! distances. Large components use pivot MDS, which only measures the
//! distances to a small set of pivot nodes.

use super::graph::{Edge, GeometryGraph};
use crate::adt::graph::{connected_components, BasicGraphOnEdges, GraphEdge};
use crate::core::config::LayoutConfig;
use crate::core::error::Result;
use crate::core::geometry::{Point, Rectangle};
use crate::core::utils::PseudoRandom;
use crate::solver::overlap::remove_overlaps;
use std::collections::VecDeque;

/// Components with more nodes than this use pivot MDS.
const PIVOT_THRESHOLD: usize = 200;
const NUM_PIVOTS: usize = 50;
const POWER_ITERATIONS: usize = 300;
const POWER_TOLERANCE: f64 = 1e-10;

/// \returns the number of hops from \p source to every node, ignoring the
/// direction of the edges, or None for the nodes that can't be reached.
pub fn hop_distances<E: GraphEdge>(graph: &BasicGraphOnEdges<E>, source: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        let Some(d) = dist[node] else {
            continue;
        };
        for (_, other) in graph.incident_edges(node) {
            if dist[other].is_none() {
                dist[other] = Some(d + 1);
                queue.push_back(other);
            }
        }
    }
    dist
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f64]) -> f64 {
    let len = dot(v, v).sqrt();
    if len > 0. {
        for x in v.iter_mut() {
            *x /= len;
        }
    }
    len
}

/// Find the largest eigenpair of the symmetric matrix that \p multiply
/// applies, after removing the eigenvectors in \p found. The matrix is
/// shifted by \p shift, to make the largest eigenvalue the dominant one.
/// \returns the eigenvalue and the unit eigenvector.
fn power_iteration<F>(
    n: usize,
    multiply: &F,
    shift: f64,
    found: &[(f64, Vec<f64>)],
    rng: &mut PseudoRandom,
) -> (f64, Vec<f64>)
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let deflate = |v: &mut Vec<f64>| {
        for (_, u) in found {
            let d = dot(v, u);
            for (x, y) in v.iter_mut().zip(u.iter()) {
                *x -= d * y;
            }
        }
    };

    let mut v: Vec<f64> = (0..n).map(|_| rng.next_f64() - 0.5).collect();
    deflate(&mut v);
    normalize(&mut v);
    let mut lambda = 0.;
    for _ in 0..POWER_ITERATIONS {
        let mut next = multiply(&v);
        for (x, y) in next.iter_mut().zip(v.iter()) {
            *x += shift * y;
        }
        deflate(&mut next);
        let new_lambda = dot(&v, &next);
        if normalize(&mut next) == 0. {
            return (-shift, v);
        }
        let change: f64 = next
            .iter()
            .zip(v.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0., f64::max);
        v = next;
        let converged = (new_lambda - lambda).abs() <= POWER_TOLERANCE * new_lambda.abs().max(1.);
        lambda = new_lambda;
        if converged && change < 1e-7 {
            break;
        }
    }
    (lambda - shift, v)
}

/// \returns the matrix of squared distances with the rows and the columns
/// centered, times -1/2.
fn double_center(sq: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let rows = sq.len();
    let cols = sq.first().map_or(0, |r| r.len());
    let row_mean: Vec<f64> = sq.iter().map(|r| r.iter().sum::<f64>() / cols as f64).collect();
    let mut col_mean = vec![0.; cols];
    for r in sq {
        for (j, x) in r.iter().enumerate() {
            col_mean[j] += x / rows as f64;
        }
    }
    let mean: f64 = row_mean.iter().sum::<f64>() / rows as f64;
    sq.iter()
        .enumerate()
        .map(|(i, r)| {
            r.iter()
                .enumerate()
                .map(|(j, x)| -0.5 * (x - row_mean[i] - col_mean[j] + mean))
                .collect()
        })
        .collect()
}

/// Classical MDS of the full distance matrix \p dist.
/// \returns the x and y coordinates.
pub fn classical_mds(dist: &[Vec<f64>], rng: &mut PseudoRandom) -> (Vec<f64>, Vec<f64>) {
    let n = dist.len();
    if n == 1 {
        return (vec![0.], vec![0.]);
    }
    let sq: Vec<Vec<f64>> = dist
        .iter()
        .map(|r| r.iter().map(|d| d * d).collect())
        .collect();
    let b = double_center(&sq);
    let multiply = |v: &[f64]| -> Vec<f64> { b.iter().map(|r| dot(r, v)).collect() };

    let mut found: Vec<(f64, Vec<f64>)> = Vec::new();
    for _ in 0..2 {
        let mut pair = power_iteration(n, &multiply, 0., &found, rng);
        // The dominant eigenvalue is negative when the distances are far
        // from euclidean. Shift it away to find the largest one.
        if pair.0 < 0. {
            pair = power_iteration(n, &multiply, -pair.0, &found, rng);
        }
        found.push(pair);
    }
    let coords = |k: usize| -> Vec<f64> {
        let (lambda, v) = &found[k];
        let s = lambda.max(0.).sqrt();
        v.iter().map(|x| x * s).collect()
    };
    (coords(0), coords(1))
}

/// Pick \p k pivots: the first is \p first and each next pivot is the node
/// farthest from the pivots that were already picked. \returns the position
/// of each pivot in \p nodes, and the hops from each pivot to all of
/// \p nodes.
fn pick_pivots<E: GraphEdge>(
    graph: &BasicGraphOnEdges<E>,
    nodes: &[usize],
    first: usize,
    k: usize,
) -> (Vec<usize>, Vec<Vec<f64>>) {
    let mut pivots = Vec::new();
    let mut rows = Vec::new();
    let mut min_dist = vec![f64::INFINITY; nodes.len()];
    let mut pivot = first;
    for _ in 0..k.min(nodes.len()) {
        pivots.push(pivot);
        let hops = hop_distances(graph, nodes[pivot]);
        let row: Vec<f64> = nodes
            .iter()
            .map(|n| hops[*n].map_or(0., |h| h as f64))
            .collect();
        for (m, d) in min_dist.iter_mut().zip(row.iter()) {
            *m = m.min(*d);
        }
        rows.push(row);
        for i in 0..nodes.len() {
            if min_dist[i] > min_dist[pivot] {
                pivot = i;
            }
        }
    }
    (pivots, rows)
}

/// Pivot MDS of the component \p nodes. The distances are measured only to
/// the pivots, in units of hops. \returns the x and y coordinates, in hops.
pub fn pivot_mds<E: GraphEdge>(
    graph: &BasicGraphOnEdges<E>,
    nodes: &[usize],
    num_pivots: usize,
    rng: &mut PseudoRandom,
) -> (Vec<f64>, Vec<f64>) {
    let n = nodes.len();
    // pivots x nodes.
    let (pivots, pivot_rows) = pick_pivots(graph, nodes, 0, num_pivots);
    let k = pivot_rows.len();
    // The matrix C is nodes x pivots.
    let sq: Vec<Vec<f64>> = (0..n)
        .map(|i| pivot_rows.iter().map(|r| r[i] * r[i]).collect())
        .collect();
    let c = double_center(&sq);

    // The eigenvectors of C^T C give the directions in the pivot space.
    let multiply = |v: &[f64]| -> Vec<f64> {
        let cv: Vec<f64> = c.iter().map(|r| dot(r, v)).collect();
        (0..k)
            .map(|j| c.iter().zip(cv.iter()).map(|(r, x)| r[j] * x).sum())
            .collect()
    };
    let mut found: Vec<(f64, Vec<f64>)> = Vec::new();
    for _ in 0..2 {
        let pair = power_iteration(k, &multiply, 0., &found, rng);
        found.push(pair);
    }
    let coords = |idx: usize| -> Vec<f64> {
        let (lambda, v) = &found[idx];
        // The eigenvalues of C^T C are about the squares of the eigenvalues
        // of the full matrix.
        let scale = if *lambda > 0. { lambda.powf(-0.25) } else { 0. };
        c.iter().map(|r| dot(r, v) * scale).collect()
    };
    let xs = coords(0);
    let ys = coords(1);

    // Fit the scale to the measured distances to the pivots.
    let mut num = 0.;
    let mut den = 0.;
    for (p, row) in pivots.iter().zip(pivot_rows.iter()) {
        for i in 0..n {
            let d = Point::new(xs[i], ys[i]).distance_to(Point::new(xs[*p], ys[*p]));
            num += d * row[i];
            den += d * d;
        }
    }
    let fit = if den > 0. { num / den } else { 1. };
    (
        xs.iter().map(|x| x * fit).collect(),
        ys.iter().map(|y| y * fit).collect(),
    )
}

/// Rotate the points (\p xs, \p ys) around the origin by \p degrees.
pub fn rotate(xs: &mut [f64], ys: &mut [f64], degrees: f64) {
    assert_eq!(xs.len(), ys.len(), "Mismatched coordinate arrays");
    if degrees == 0. {
        return;
    }
    let angle = degrees.to_radians();
    for (x, y) in xs.iter_mut().zip(ys.iter_mut()) {
        let p = Point::new(*x, *y).rotate(angle);
        *x = p.x;
        *y = p.y;
    }
}

/// Place the nodes of a single connected component. \returns the centers,
/// in the order of \p nodes.
fn layout_component(
    g: &GeometryGraph,
    graph: &BasicGraphOnEdges<Edge>,
    nodes: &[usize],
    config: &LayoutConfig,
    rng: &mut PseudoRandom,
) -> Result<Vec<Point>> {
    let (mut xs, mut ys) = if nodes.len() > PIVOT_THRESHOLD {
        #[cfg(feature = "log")]
        log::debug!("Pivot MDS of a component with {} nodes", nodes.len());
        pivot_mds(graph, nodes, NUM_PIVOTS, rng)
    } else {
        let dist: Vec<Vec<f64>> = nodes
            .iter()
            .map(|n| {
                let hops = hop_distances(graph, *n);
                nodes.iter().map(|m| hops[*m].map_or(0., |h| h as f64)).collect()
            })
            .collect();
        classical_mds(&dist, rng)
    };
    for v in xs.iter_mut().chain(ys.iter_mut()) {
        *v *= config.ideal_edge_length;
    }
    rotate(&mut xs, &mut ys, config.rotation);

    let centers: Vec<Point> = xs.iter().zip(ys.iter()).map(|(x, y)| Point::new(*x, *y)).collect();
    if !config.remove_overlaps {
        return Ok(centers);
    }
    let rects: Vec<Rectangle> = nodes
        .iter()
        .zip(centers.iter())
        .map(|(n, c)| Rectangle::from_center(*c, g.node(*n).size))
        .collect();
    let rects = remove_overlaps(&rects, config.node_separation)?;
    Ok(rects.iter().map(|r| r.center()).collect())
}

/// Place the nodes of \p g with MDS. Each connected component is laid out on
/// its own, and the components are packed from left to right.
/// \returns the center of each node.
pub fn mds_layout(g: &GeometryGraph, config: &LayoutConfig) -> Result<Vec<Point>> {
    #[cfg(feature = "log")]
    log::info!("MDS layout of {} nodes", g.num_nodes());
    let graph = g.to_graph();
    let mut rng = PseudoRandom::new(7);
    let mut centers = vec![Point::zero(); g.num_nodes()];
    let mut next_left = 0.;
    for component in connected_components(&graph) {
        let placed = layout_component(g, &graph, &component, config, &mut rng)?;
        let mut bbox = Rectangle::empty();
        for (n, c) in component.iter().zip(placed.iter()) {
            bbox = bbox.union(&Rectangle::from_center(*c, g.node(*n).size));
        }
        let offset = Point::new(next_left - bbox.left(), -bbox.top());
        for (n, c) in component.iter().zip(placed.iter()) {
            centers[*n] = c.add(offset);
        }
        next_left += bbox.width() + config.node_separation;
    }
    Ok(centers)
}

#[cfg(test)]
use super::graph::NodeShape;

#[test]
fn test_rotate() {
    let mut xs = vec![1., 0.];
    let mut ys = vec![0., 2.];
    rotate(&mut xs, &mut ys, 90.);
    assert!(xs[0].abs() < 1e-9 && (ys[0] - 1.).abs() < 1e-9);
    assert!((xs[1] + 2.).abs() < 1e-9 && ys[1].abs() < 1e-9);
}

#[test]
fn test_classical_mds_path() {
    // Three nodes on a path embed on a line with the hop distances.
    let dist = vec![vec![0., 1., 2.], vec![1., 0., 1.], vec![2., 1., 0.]];
    let mut rng = PseudoRandom::new(3);
    let (xs, ys) = classical_mds(&dist, &mut rng);
    let p: Vec<Point> = xs.iter().zip(ys.iter()).map(|(x, y)| Point::new(*x, *y)).collect();
    for i in 0..3 {
        for j in 0..3 {
            assert!((p[i].distance_to(p[j]) - dist[i][j]).abs() < 1e-4);
        }
    }
}

#[test]
fn test_pivot_mds_grid() {
    // A 20x20 grid keeps the neighbors close and the corners far apart.
    let mut g = GeometryGraph::new();
    let w = 20;
    for _ in 0..w * w {
        g.add_node(1., 1., NodeShape::Box);
    }
    for i in 0..w {
        for j in 0..w {
            if i + 1 < w {
                g.add_edge(i * w + j, (i + 1) * w + j);
            }
            if j + 1 < w {
                g.add_edge(i * w + j, i * w + j + 1);
            }
        }
    }
    let graph = g.to_graph();
    let nodes: Vec<usize> = (0..w * w).collect();
    let mut rng = PseudoRandom::new(3);
    let (xs, ys) = pivot_mds(&graph, &nodes, 10, &mut rng);
    let p = |i: usize| Point::new(xs[i], ys[i]);
    let corner = p(0).distance_to(p(w * w - 1));
    let neighbor = p(0).distance_to(p(1));
    assert!(corner > 10. * neighbor);
    assert!(corner > 15. && corner < 45.);
}

#[test]
fn test_mds_components() {
    let mut g = GeometryGraph::new();
    for _ in 0..5 {
        g.add_node(10., 10., NodeShape::Ellipse);
    }
    g.add_edge(0, 1);
    g.add_edge(1, 2);
    g.add_edge(3, 4);
    let config = LayoutConfig::default();
    let centers = mds_layout(&g, &config).unwrap();
    // The first component is to the left of the second.
    let right_of_first = (0..3).map(|i| centers[i].x).fold(f64::MIN, f64::max);
    let left_of_second = (3..5).map(|i| centers[i].x).fold(f64::MAX, f64::min);
    assert!(right_of_first + 10. + config.node_separation <= left_of_second + 1e-6);
    // Connected nodes are about one edge length apart.
    let d = centers[3].distance_to(centers[4]);
    assert!((d - config.ideal_edge_length).abs() < 1.);
}
