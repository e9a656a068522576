//! The ranked DAG of the layered pipeline. It keeps the successor and
//! predecessor lists of every node, and splits the nodes into rows (ranks).
//! The order of the nodes in a row is their left to right order. The
//! pipeline moves nodes between rows and reorders rows freely; the only
//! invariant is that every node sits in exactly one row.

use super::graph::{topological_order, BasicGraphOnEdges};

/// The rows of the dag, top to bottom.
pub type RankType = Vec<Vec<NodeHandle>>;

/// A handle to a node of the dag.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Debug)]
pub struct NodeHandle {
    idx: usize,
}

impl NodeHandle {
    pub fn new(x: usize) -> Self {
        NodeHandle { idx: x }
    }
    pub fn get_index(&self) -> usize {
        self.idx
    }
}

impl From<usize> for NodeHandle {
    fn from(idx: usize) -> Self {
        NodeHandle { idx }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    successors: Vec<NodeHandle>,
    predecessors: Vec<NodeHandle>,
}

#[derive(Debug, Clone, Default)]
pub struct DAG {
    nodes: Vec<Node>,
    ranks: RankType,
    /// The row of each node.
    levels: Vec<usize>,
}

impl DAG {
    pub fn new() -> Self {
        Self::default()
    }

    /// \returns an iterator over the handles of all nodes.
    pub fn iter(&self) -> impl Iterator<Item = NodeHandle> {
        (0..self.nodes.len()).map(NodeHandle::from)
    }

    pub fn add_edge(&mut self, from: NodeHandle, to: NodeHandle) {
        self.nodes[from.idx].successors.push(to);
        self.nodes[to.idx].predecessors.push(from);
    }

    /// Remove an edge from \p from to \p to.
    /// \returns True if an edge was removed.
    pub fn remove_edge(&mut self, from: NodeHandle, to: NodeHandle) -> bool {
        let succ = &mut self.nodes[from.idx].successors;
        let mut removed_succ = false;

        if let Some(pos) = succ.iter().position(|x| *x == to) {
            succ.remove(pos);
            removed_succ = true;
        }

        let pred = &mut self.nodes[to.idx].predecessors;
        let mut removed_pred = false;
        if let Some(pos) = pred.iter().position(|x| *x == from) {
            pred.remove(pos);
            removed_pred = true;
        }

        // The pred-succ lists must always agree.
        assert_eq!(removed_pred, removed_succ);
        removed_pred
    }

    /// Create a new node. New nodes are placed in the first rank.
    pub fn new_node(&mut self) -> NodeHandle {
        self.nodes.push(Node::default());
        self.levels.push(0);
        let node = NodeHandle::new(self.nodes.len() - 1);
        self.add_element_to_rank(node, 0);
        node
    }

    pub fn successors(&self, from: NodeHandle) -> &Vec<NodeHandle> {
        &self.nodes[from.idx].successors
    }

    pub fn predecessors(&self, from: NodeHandle) -> &Vec<NodeHandle> {
        &self.nodes[from.idx].predecessors
    }

    /// \returns the dag as an edge-list graph.
    pub fn to_graph(&self) -> BasicGraphOnEdges<(usize, usize)> {
        let mut g = BasicGraphOnEdges::new(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            for succ in node.successors.iter() {
                g.add_edge((i, succ.idx));
            }
        }
        g
    }

    /// Check that the edges are valid, that the graph is acyclic and that
    /// every node is in the row that its level names.
    pub fn verify(&self) {
        for node in &self.nodes {
            for edge in &node.successors {
                assert!(edge.idx < self.nodes.len(), "Dangling edge");
            }
        }
        assert!(topological_order(&self.to_graph()).is_some(), "Found a cycle");
        assert_eq!(self.count_nodes_in_ranks(), self.len());
        for (level, row) in self.ranks.iter().enumerate() {
            for node in row {
                assert_eq!(self.levels[node.idx], level, "Stale level");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// \returns True if there is a path from \p 'from' to \p 'to'.
    pub fn is_reachable(&self, from: NodeHandle, to: NodeHandle) -> bool {
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut worklist = vec![from];
        visited[from.idx] = true;
        while let Some(current) = worklist.pop() {
            for next in self.nodes[current.idx].successors.iter() {
                if *next == to {
                    return true;
                }
                if !visited[next.idx] {
                    visited[next.idx] = true;
                    worklist.push(*next);
                }
            }
        }
        false
    }

    /// \returns the number of ranks in the dag.
    pub fn num_levels(&self) -> usize {
        self.ranks.len()
    }

    /// \return a mutable reference to a row at level \p level.
    pub fn row_mut(&mut self, level: usize) -> &mut Vec<NodeHandle> {
        assert!(level < self.ranks.len(), "Invalid rank");
        &mut self.ranks[level]
    }

    /// \return a reference to a row at level \p level.
    pub fn row(&self, level: usize) -> &Vec<NodeHandle> {
        assert!(level < self.ranks.len(), "Invalid rank");
        &self.ranks[level]
    }

    /// \return a reference to the whole rank data structure.
    pub fn ranks(&self) -> &RankType {
        &self.ranks
    }

    /// \return a mutable reference to the whole rank data structure.
    pub fn ranks_mut(&mut self) -> &mut RankType {
        &mut self.ranks
    }

    /// Place the element \p elem at the end of the level \p level. If the
    /// level does not exist then create it.
    fn add_element_to_rank(&mut self, elem: NodeHandle, level: usize) {
        while self.ranks.len() < level + 1 {
            self.ranks.push(Vec::new());
        }
        self.ranks[level].push(elem);
        self.levels[elem.get_index()] = level;
    }

    /// Places all of the nodes in ranks (levels), using the longest path from
    /// the sources.
    pub fn recompute_node_ranks(&mut self) {
        assert!(!self.is_empty(), "Sorting an empty graph");
        let order = topological_order(&self.to_graph());
        let Some(order) = order else {
            panic!("Ranking a graph with a cycle");
        };
        let levels = self.compute_levels(&order);
        self.ranks.clear();
        for (i, level) in levels.iter().enumerate() {
            self.add_element_to_rank(NodeHandle::from(i), *level);
        }
    }

    /// \returns the number of nodes that are in ranks.
    fn count_nodes_in_ranks(&self) -> usize {
        self.ranks.iter().map(|row| row.len()).sum()
    }

    /// Move the node \p node to a new level \p new_level, at the end of the
    /// row.
    pub fn update_node_rank_level(&mut self, node: NodeHandle, new_level: usize) {
        let curr_level = self.level(node);
        let level = &mut self.ranks[curr_level];
        let Some(idx) = level.iter().position(|x| *x == node) else {
            panic!("node not found");
        };
        level.remove(idx);
        self.add_element_to_rank(node, new_level);
        assert_eq!(self.level(node), new_level);
    }

    /// Remove empty rows from the end of the rank.
    pub fn trim_empty_rows(&mut self) {
        while let Some(last) = self.ranks.last() {
            if !last.is_empty() {
                break;
            }
            self.ranks.pop();
        }
    }

    /// \returns the level of the node \p node in the rank.
    pub fn level(&self, node: NodeHandle) -> usize {
        assert!(node.get_index() < self.len(), "Node not in the dag");
        self.levels[node.get_index()]
    }

    /// \returns the longest path level of each node, visiting the nodes in
    /// the topological order \p order.
    fn compute_levels(&self, order: &[usize]) -> Vec<usize> {
        assert_eq!(order.len(), self.nodes.len());
        let mut levels = vec![0; self.nodes.len()];
        for src in order {
            for dest in self.nodes[*src].successors.iter() {
                levels[dest.idx] = levels[dest.idx].max(levels[*src] + 1);
            }
        }
        levels
    }
}

#[test]
fn test_simple_construction() {
    let mut g = DAG::new();
    let h: Vec<NodeHandle> = (0..5).map(|_| g.new_node()).collect();
    g.verify();
    assert_ne!(h[0], h[1]);

    g.add_edge(h[0], h[1]);
    g.add_edge(h[1], h[2]);
    g.add_edge(h[0], h[2]);
    g.add_edge(h[2], h[3]);
    g.add_edge(h[3], h[4]);
    g.verify();

    g.recompute_node_ranks();
    assert_eq!(g.num_levels(), 5);
    assert_eq!(g.level(h[2]), 2);
    assert!(g.is_reachable(h[0], h[4]));
    assert!(!g.is_reachable(h[4], h[0]));
}

#[test]
fn test_rank_api() {
    let mut g = DAG::new();
    let h0 = g.new_node();
    let h1 = g.new_node();
    let h2 = g.new_node();

    g.add_edge(h0, h1);
    g.add_edge(h1, h2);

    g.recompute_node_ranks();
    g.verify();

    assert_eq!(g.level(h0), 0);
    assert_eq!(g.level(h1), 1);
    assert_eq!(g.level(h2), 2);

    g.update_node_rank_level(h2, 4);
    assert_eq!(g.num_levels(), 5);
    g.update_node_rank_level(h2, 2);
    g.trim_empty_rows();
    assert_eq!(g.num_levels(), 3);

    let r1 = g.remove_edge(h0, h1);
    let r2 = g.remove_edge(h0, h1);
    // Should be able to remove the edge that we inserted.
    assert!(r1);
    // The edge should no longer be there!
    assert!(!r2);
}
