//! Generators of synthetic graphs, for the command line tools and for tests.

use super::graph::{GeometryGraph, NodeShape};
use crate::core::geometry::Point;
use crate::core::utils::PseudoRandom;

/// The families of synthetic graphs.
pub const KINDS: [&str; 5] = ["chain", "tree", "grid", "cycle", "clustered"];

/// Add \p n nodes of varying sizes to \p g.
fn add_nodes(g: &mut GeometryGraph, n: usize, rng: &mut PseudoRandom) {
    for i in 0..n {
        let width = 30. + rng.below(5) as f64 * 10.;
        let shape = if i % 3 == 2 {
            NodeShape::Ellipse
        } else {
            NodeShape::Box
        };
        g.add_node(width, 24., shape);
    }
}

/// A path of \p n nodes.
pub fn chain(n: usize) -> GeometryGraph {
    let mut g = GeometryGraph::new();
    add_nodes(&mut g, n, &mut PseudoRandom::new(1));
    for i in 1..n {
        g.add_edge(i - 1, i);
    }
    g
}

/// A binary tree of \p n nodes, where every third edge has a label.
pub fn tree(n: usize) -> GeometryGraph {
    let mut g = GeometryGraph::new();
    add_nodes(&mut g, n, &mut PseudoRandom::new(2));
    for i in 1..n {
        let label = if i % 3 == 0 {
            Some(Point::new(20., 10.))
        } else {
            None
        };
        g.add_labeled_edge((i - 1) / 2, i, label);
    }
    g
}

/// A square grid with about \p n nodes.
pub fn grid(n: usize) -> GeometryGraph {
    let w = ((n as f64).sqrt().round() as usize).max(1);
    let mut g = GeometryGraph::new();
    add_nodes(&mut g, w * w, &mut PseudoRandom::new(3));
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
    g
}

/// A cycle of \p n nodes, with a chord and a self loop.
pub fn cycle(n: usize) -> GeometryGraph {
    let mut g = GeometryGraph::new();
    add_nodes(&mut g, n, &mut PseudoRandom::new(4));
    for i in 0..n {
        g.add_edge(i, (i + 1) % n);
    }
    if n > 3 {
        g.add_edge(0, n / 2);
    }
    if n > 0 {
        g.add_edge(n - 1, n - 1);
    }
    g
}

/// Random edges between \p n nodes that are grouped into two clusters, one
/// of them nested in a third cluster.
pub fn clustered(n: usize) -> GeometryGraph {
    let mut rng = PseudoRandom::new(5);
    let mut g = GeometryGraph::new();
    add_nodes(&mut g, n, &mut rng);
    for i in 1..n {
        let other = rng.below(i);
        g.add_edge(other, i);
    }
    let half = n / 2;
    let first = g.add_cluster((0..half / 2).collect(), vec![], 8.);
    g.add_cluster((half / 2..half).collect(), vec![first], 8.);
    g.add_cluster((half..n).collect(), vec![], 8.);
    g
}

/// \returns the synthetic graph \p kind with about \p n nodes, or None if
/// the kind is unknown.
pub fn generate(kind: &str, n: usize) -> Option<GeometryGraph> {
    match kind {
        "chain" => Some(chain(n)),
        "tree" => Some(tree(n)),
        "grid" => Some(grid(n)),
        "cycle" => Some(cycle(n)),
        "clustered" => Some(clustered(n)),
        _ => None,
    }
}

#[test]
fn test_generators() {
    for kind in KINDS {
        let g = generate(kind, 16).unwrap();
        g.verify();
        assert_eq!(g.num_nodes(), 16);
    }
    assert!(generate("star", 3).is_none());
    assert_eq!(cycle(5).num_edges(), 7);
    assert_eq!(clustered(10).clusters().len(), 3);
}
