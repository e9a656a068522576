//! The input and the output of the layout engine. The input is an abstract
//! graph that only knows the sizes of the nodes, the edges between them and
//! the way nodes are grouped into clusters. The output is the geometry.

use crate::adt::graph::{BasicGraphOnEdges, GraphEdge};
use crate::core::curve::Curve;
use crate::core::geometry::{Point, Rectangle};
use std::fmt;

/// The outline of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Box,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub size: Point,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    /// The size of the label of the edge, if it has one.
    pub label: Option<Point>,
}

impl GraphEdge for Edge {
    fn source(&self) -> usize {
        self.source
    }
    fn target(&self) -> usize {
        self.target
    }
}

/// A group of nodes that is drawn inside a box.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// The nodes that belong to the cluster directly.
    pub nodes: Vec<usize>,
    /// The nested clusters.
    pub clusters: Vec<usize>,
    /// The space between the members and the cluster boundary.
    pub padding: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GeometryGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    clusters: Vec<Cluster>,
}

impl GeometryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node of size \p width x \p height.
    /// \returns the index of the node.
    pub fn add_node(&mut self, width: f64, height: f64, shape: NodeShape) -> usize {
        assert!(width >= 0. && height >= 0., "Invalid node size");
        self.nodes.push(Node {
            size: Point::new(width, height),
            shape,
        });
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, target: usize) -> usize {
        self.add_labeled_edge(source, target, None)
    }

    pub fn add_labeled_edge(&mut self, source: usize, target: usize, label: Option<Point>) -> usize {
        assert!(source < self.nodes.len(), "Invalid source node");
        assert!(target < self.nodes.len(), "Invalid target node");
        self.edges.push(Edge {
            source,
            target,
            label,
        });
        self.edges.len() - 1
    }

    /// Add a cluster with the direct members \p nodes and the nested
    /// clusters \p clusters. \returns the index of the cluster.
    pub fn add_cluster(&mut self, nodes: Vec<usize>, clusters: Vec<usize>, padding: f64) -> usize {
        for n in nodes.iter() {
            assert!(*n < self.nodes.len(), "Invalid cluster member");
        }
        self.clusters.push(Cluster {
            nodes,
            clusters,
            padding,
        });
        self.clusters.len() - 1
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// \returns the edges as a graph on node indices.
    pub fn to_graph(&self) -> BasicGraphOnEdges<Edge> {
        BasicGraphOnEdges::from_edges(self.nodes.len(), self.edges.clone())
    }

    pub fn verify(&self) {
        for c in self.clusters.iter() {
            for sub in c.clusters.iter() {
                assert!(*sub < self.clusters.len(), "Invalid nested cluster");
            }
        }
    }
}

/// The geometry of a laid out graph.
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub nodes: Vec<Rectangle>,
    /// The curve of each edge, or None if the edges are not routed.
    pub edges: Vec<Option<Curve>>,
    /// The box of the label of each labeled edge.
    pub labels: Vec<Option<Rectangle>>,
    pub clusters: Vec<Rectangle>,
    pub bbox: Rectangle,
}

impl LayoutResult {
    /// \returns the center of the node \p idx.
    pub fn center(&self, idx: usize) -> Point {
        self.nodes[idx].center()
    }

    pub fn translate(&mut self, d: Point) {
        for n in self.nodes.iter_mut() {
            *n = n.translate(d);
        }
        for c in self.clusters.iter_mut() {
            *c = c.translate(d);
        }
        for l in self.labels.iter_mut().flatten() {
            *l = l.translate(d);
        }
        for curve in self.edges.iter_mut().flatten() {
            curve.translate(d);
        }
        self.bbox = self.bbox.translate(d);
    }

    /// Recompute the bounding box of everything in the drawing.
    pub fn update_bbox(&mut self) {
        let mut bbox = Rectangle::empty();
        for r in self.nodes.iter().chain(self.clusters.iter()) {
            bbox = bbox.union(r);
        }
        for l in self.labels.iter().flatten() {
            bbox = bbox.union(l);
        }
        for curve in self.edges.iter().flatten() {
            bbox = bbox.union(&curve.bounding_box());
        }
        if bbox.is_empty() {
            bbox = Rectangle::new(Point::zero(), Point::zero());
        }
        self.bbox = bbox;
    }
}

impl fmt::Display for LayoutResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "graph {}", self.bbox)?;
        for (i, n) in self.nodes.iter().enumerate() {
            writeln!(f, "node {} {}", i, n)?;
        }
        for (i, c) in self.clusters.iter().enumerate() {
            writeln!(f, "cluster {} {}", i, c)?;
        }
        for (i, e) in self.edges.iter().enumerate() {
            match e {
                Some(curve) => writeln!(f, "edge {} {}", i, curve)?,
                None => writeln!(f, "edge {} -", i)?,
            }
            if let Some(Some(label)) = self.labels.get(i) {
                writeln!(f, "label {} {}", i, label)?;
            }
        }
        Ok(())
    }
}

#[test]
fn test_geometry_graph() {
    let mut g = GeometryGraph::new();
    let a = g.add_node(10., 10., NodeShape::Box);
    let b = g.add_node(20., 10., NodeShape::Ellipse);
    g.add_edge(a, b);
    g.add_labeled_edge(b, a, Some(Point::new(5., 5.)));
    let c = g.add_cluster(vec![a, b], vec![], 4.);
    g.verify();
    assert_eq!(c, 0);
    assert_eq!(g.num_nodes(), 2);
    assert_eq!(g.num_edges(), 2);
    let eg = g.to_graph();
    assert_eq!(eg.successors(b).collect::<Vec<_>>(), vec![a]);
}

#[test]
fn test_result_dump() {
    let mut r = LayoutResult {
        nodes: vec![Rectangle::from_center(Point::new(5., 5.), Point::new(10., 10.))],
        edges: vec![None],
        labels: vec![None],
        clusters: vec![],
        bbox: Rectangle::empty(),
    };
    r.update_bbox();
    r.translate(Point::new(1., 0.));
    assert_eq!(r.center(0), Point::new(6., 5.));
    let text = r.to_string();
    assert!(text.starts_with("graph center (x: 6.000, y: 5.000)"));
    assert!(text.contains("edge 0 -"));
}
