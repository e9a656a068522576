//! This module contains the implementation of LayeredGraph, which is the
//! data-structure that we use for assigning (x,y) locations to the nodes of a
//! layered drawing. The LayeredGraph uses a DAG to represent the relationships
//! between the nodes and the Ranks data-structure to represent rows of nodes
//! that share the same y coordinate. Edges that span several rows go through
//! connector nodes, and edge labels are connectors with a size.

use crate::adt::dag::*;
use crate::adt::graph::{feedback_edges, has_cycle, BasicGraphOnEdges};
use crate::core::base::Orientation;
use crate::core::config::LayoutConfig;
use crate::core::error::Result;
use crate::core::geometry::{Point, Rectangle};
use crate::topo::optimizer::EdgeCrossOptimizer;
use crate::topo::optimizer::RankOptimizer;

use super::placer::Placer;

#[derive(Debug, Clone, Copy)]
struct Element {
    size: Point,
    /// The center of the element.
    pos: Point,
    /// Connectors are the nodes that edges go through, and edge labels.
    connector: bool,
}

#[derive(Debug, Clone)]
struct EdgeChain {
    /// The nodes that the edge visits, in the direction of the dag.
    nodes: Vec<NodeHandle>,
    /// Set if the edge goes against the dag.
    reversed: bool,
    /// The connector that holds the label of the edge.
    label: Option<NodeHandle>,
    label_size: Option<Point>,
}

#[derive(Debug)]
pub struct LayeredGraph {
    // Holds all of the elements in the graph.
    nodes: Vec<Element>,
    // The edges and the list of elements that they visit.
    edges: Vec<EdgeChain>,
    // Representing the connections between the nodes. Used to keep the graph
    // a dag by reversing edges. Used to create 'levels'. After lowering, the
    // graph only contains edges between consecutive levels.
    pub dag: DAG,
    // Sets the graph orientation (L-to-R, or T-to-B).
    orientation: Orientation,
}

impl LayeredGraph {
    pub fn new(orientation: Orientation) -> Self {
        LayeredGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            dag: DAG::new(),
            orientation,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn num_nodes(&self) -> usize {
        self.dag.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeHandle> {
        self.dag.iter()
    }

    pub fn succ(&self, node: NodeHandle) -> &Vec<NodeHandle> {
        self.dag.successors(node)
    }

    pub fn preds(&self, node: NodeHandle) -> &Vec<NodeHandle> {
        self.dag.predecessors(node)
    }

    pub fn pos(&self, n: NodeHandle) -> Point {
        self.nodes[n.get_index()].pos
    }

    pub fn pos_mut(&mut self, n: NodeHandle) -> &mut Point {
        &mut self.nodes[n.get_index()].pos
    }

    pub fn size(&self, n: NodeHandle) -> Point {
        self.nodes[n.get_index()].size
    }

    pub fn bbox(&self, n: NodeHandle) -> Rectangle {
        let elem = &self.nodes[n.get_index()];
        Rectangle::from_center(elem.pos, elem.size)
    }

    pub fn is_connector(&self, n: NodeHandle) -> bool {
        self.nodes[n.get_index()].connector
    }

    /// Swap the x and y axis of all of the elements.
    pub fn transpose(&mut self) {
        for elem in self.nodes.iter_mut() {
            elem.pos = elem.pos.transpose();
            elem.size = elem.size.transpose();
        }
    }

    /// Mirror the elements around the x axis, or around the y axis if
    /// \p along_x is set.
    pub fn mirror(&mut self, along_x: bool) {
        for elem in self.nodes.iter_mut() {
            if along_x {
                elem.pos.x = -elem.pos.x;
            } else {
                elem.pos.y = -elem.pos.y;
            }
        }
    }

    /// Move all of the elements so that the drawing starts at the origin.
    pub fn normalize(&mut self) {
        let mut bbox = Rectangle::empty();
        for n in self.iter_nodes() {
            bbox = bbox.union(&self.bbox(n));
        }
        if bbox.is_empty() {
            return;
        }
        for elem in self.nodes.iter_mut() {
            elem.pos = elem.pos.sub(bbox.min);
        }
    }

    /// Add a node of size \p size to the graph.
    /// \returns a handle to the node.
    pub fn add_node(&mut self, size: Point) -> NodeHandle {
        self.add_element(size, false)
    }

    fn add_element(&mut self, size: Point, connector: bool) -> NodeHandle {
        let res = self.dag.new_node();
        assert!(res.get_index() == self.nodes.len());
        self.nodes.push(Element {
            size,
            pos: Point::zero(),
            connector,
        });
        res
    }

    /// Add an edge to the graph, with an optional label of size \p label.
    /// \returns the index of the edge.
    pub fn add_edge(&mut self, from: NodeHandle, to: NodeHandle, label: Option<Point>) -> usize {
        assert!(from.get_index() < self.nodes.len(), "Invalid handle");
        assert!(to.get_index() < self.nodes.len(), "Invalid handle");
        self.edges.push(EdgeChain {
            nodes: vec![from, to],
            reversed: false,
            label: None,
            label_size: label,
        });
        self.edges.len() - 1
    }

    fn is_self_edge(&self, edge: usize) -> bool {
        let lst = &self.edges[edge].nodes;
        lst.first() == lst.last()
    }

    /// \returns the nodes that the edge \p edge visits, from the source of
    /// the edge to its target.
    pub fn edge_chain(&self, edge: usize) -> Vec<NodeHandle> {
        let chain = &self.edges[edge];
        let mut lst = chain.nodes.clone();
        if chain.reversed {
            lst.reverse();
        }
        lst
    }

    /// \returns True if the edge \p edge points against the layers.
    pub fn is_reversed(&self, edge: usize) -> bool {
        self.edges[edge].reversed
    }

    /// \returns the box of the label of the edge \p edge.
    pub fn label_box(&self, edge: usize) -> Option<Rectangle> {
        self.edges[edge].label.map(|n| self.bbox(n))
    }
}

impl LayeredGraph {
    /// Lower the graph and assign coordinates to all of the elements.
    pub fn do_it(&mut self, config: &LayoutConfig) -> Result<()> {
        self.lower(config);
        Placer::new(self, config).layout()
    }

    fn lower(&mut self, config: &LayoutConfig) {
        #[cfg(feature = "log")]
        log::info!("Lowering a graph with {} nodes.", self.num_nodes());
        if self.dag.is_empty() {
            return;
        }
        self.to_valid_dag();
        self.split_text_edges();
        self.split_long_edges(config.crossing_passes);
    }

    /// \returns the graph of the current edges (without self edges), and the
    /// index of the edge chain of each graph edge.
    fn edge_graph(&self) -> (BasicGraphOnEdges<(usize, usize)>, Vec<usize>) {
        let mut g = BasicGraphOnEdges::new(self.nodes.len());
        let mut chains = Vec::new();
        for (i, chain) in self.edges.iter().enumerate() {
            if self.is_self_edge(i) {
                continue;
            }
            let from = chain.nodes[0];
            let to = chain.nodes[chain.nodes.len() - 1];
            g.add_edge((from.get_index(), to.get_index()));
            chains.push(i);
        }
        (g, chains)
    }

    /// Flip the edges in the graph to create a valid dag. Self edges are not
    /// added to the dag; the router draws them as loops.
    /// This is the first step of graph canonicalization.
    pub fn to_valid_dag(&mut self) {
        // At this point the DAG should have all of the nodes, but none of the
        // edges.
        assert_eq!(self.nodes.len(), self.dag.len(), "bad number of nodes");

        // Reverse the edges that close cycles until no cycles are left.
        for _ in 0..=self.edges.len() {
            let (g, chains) = self.edge_graph();
            if !has_cycle(&g) {
                break;
            }
            for e in feedback_edges(&g) {
                let chain = &mut self.edges[chains[e]];
                chain.nodes.reverse();
                chain.reversed = !chain.reversed;
            }
        }

        let (g, _) = self.edge_graph();
        if has_cycle(&g) {
            panic!("Unable to break the cycles of the graph");
        }
        for (from, to) in g.edges() {
            self.dag.add_edge(NodeHandle::from(*from), NodeHandle::from(*to));
        }
        self.dag.verify();
    }

    /// Convert all of the edges that contain labels to edges that go through
    /// connectors with the size of the label.
    /// This is the second step of graph canonicalization.
    pub fn split_text_edges(&mut self) {
        for i in 0..self.edges.len() {
            let Some(size) = self.edges[i].label_size else {
                continue;
            };
            if self.is_self_edge(i) {
                continue;
            }
            let from = self.edges[i].nodes[0];
            let to = self.edges[i].nodes[1];

            // Create a new connection block.
            let conn = self.add_element(size, true);
            self.edges[i].nodes = vec![from, conn, to];
            self.edges[i].label = Some(conn);

            // Add the edge to dag.
            let res = self.dag.remove_edge(from, to);
            assert!(res, "Expected the edge to be in the graph!");
            self.dag.add_edge(from, conn);
            self.dag.add_edge(conn, to);
        }
    }

    /// Assign ranks to the nodes, and split edges that skip levels by
    /// inserting connectors. Then reorder the rows to reduce the number of
    /// crossings, with \p passes sweeps.
    pub fn split_long_edges(&mut self, passes: usize) {
        // Assign optimal rank to nodes in the graph.
        self.dag.recompute_node_ranks();
        self.dag.verify();
        RankOptimizer::new(&mut self.dag).optimize();

        let mut edges = self.edges.clone();

        for edge in edges.iter_mut() {
            let mut lst = edge.nodes.clone();
            if lst.first() == lst.last() {
                continue;
            }

            // Points the 'to' edge in each pair in the graph. We start with
            // node '1', and compare to the previous node.
            let mut i = 1;
            while i < lst.len() {
                let prev = lst[i - 1];
                let curr = lst[i];

                let prev_level = self.dag.level(prev);
                let curr_level = self.dag.level(curr);

                // If the edges point to a lower rank then move on.
                assert!(prev_level < curr_level, "Invalid edge");
                if prev_level + 1 == curr_level {
                    i += 1;
                    continue;
                }

                // We need to add a new connector node.
                let conn = self.add_element(Point::zero(), true);
                lst.insert(i, conn);

                // Update the dag connections.
                self.dag.remove_edge(prev, curr);
                self.dag.add_edge(prev, conn);
                self.dag.add_edge(conn, curr);

                // Place the new connection node at the right level.
                self.dag.update_node_rank_level(conn, prev_level + 1);
            }

            edge.nodes = lst;
        }
        self.edges = edges;
        self.dag.trim_empty_rows();

        EdgeCrossOptimizer::new(&mut self.dag, passes).optimize();
        self.dag.verify();
    }
}

#[cfg(test)]
fn square(g: &mut LayeredGraph) -> NodeHandle {
    g.add_node(Point::new(10., 10.))
}

#[test]
fn test_break_cycles() {
    let mut g = LayeredGraph::new(Orientation::TopToBottom);
    let h: Vec<NodeHandle> = (0..3).map(|_| square(&mut g)).collect();
    g.add_edge(h[0], h[1], None);
    g.add_edge(h[1], h[2], None);
    let back = g.add_edge(h[2], h[0], None);
    let selfie = g.add_edge(h[1], h[1], None);
    g.to_valid_dag();
    assert!(g.is_reversed(back));
    assert!(!g.is_reversed(0));
    // The chain is reported in the original direction.
    assert_eq!(g.edge_chain(back), vec![h[2], h[0]]);
    // Self edges are not part of the dag.
    assert_eq!(g.edge_chain(selfie), vec![h[1], h[1]]);
    assert!(!g.succ(h[1]).contains(&h[1]));
}

#[test]
fn test_split_long_edges() {
    let mut g = LayeredGraph::new(Orientation::TopToBottom);
    let h: Vec<NodeHandle> = (0..4).map(|_| square(&mut g)).collect();
    g.add_edge(h[0], h[1], None);
    g.add_edge(h[1], h[2], None);
    g.add_edge(h[2], h[3], None);
    let long = g.add_edge(h[0], h[3], None);
    let labeled = g.add_edge(h[0], h[1], Some(Point::new(30., 8.)));
    g.lower(&LayoutConfig::default());

    // The label pushes the chain down by one level, so the long edge spans
    // four levels and goes through three connectors.
    let chain = g.edge_chain(long);
    assert_eq!(chain.len(), 5);
    for w in chain.windows(2) {
        assert_eq!(g.dag.level(w[0]) + 1, g.dag.level(w[1]));
    }
    assert!(chain[1..4].iter().all(|n| g.is_connector(*n)));
    assert!(!g.is_connector(chain[4]));

    // The label sits in the middle of its edge, and moves node 1 down.
    let chain = g.edge_chain(labeled);
    assert_eq!(chain.len(), 3);
    assert_eq!(g.size(chain[1]), Point::new(30., 8.));
    assert!(g.label_box(labeled).is_some());
    assert_eq!(g.dag.level(h[1]), 2);
    g.dag.verify();
}
