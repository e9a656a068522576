//! A light graph representation that is defined by a list of edges, and the
//! generic algorithms that run on it: depth first search, topological sort,
//! cycle detection, minimum spanning trees and connected components.

use super::priority_queue::GenericBinaryHeapPriorityQueue;

/// An edge that connects two node indices.
pub trait GraphEdge {
    fn source(&self) -> usize;
    fn target(&self) -> usize;
}

impl GraphEdge for (usize, usize) {
    fn source(&self) -> usize {
        self.0
    }
    fn target(&self) -> usize {
        self.1
    }
}

/// A graph on the nodes 0..n that is defined by its edge list. The graph
/// does not own node objects, only the edges and the adjacency lists of edge
/// indices.
#[derive(Debug, Clone)]
pub struct BasicGraphOnEdges<E: GraphEdge> {
    edges: Vec<E>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
}

impl<E: GraphEdge> BasicGraphOnEdges<E> {
    pub fn new(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            out_edges: vec![Vec::new(); node_count],
            in_edges: vec![Vec::new(); node_count],
        }
    }

    pub fn from_edges(node_count: usize, edges: Vec<E>) -> Self {
        let mut g = Self::new(node_count);
        for e in edges {
            g.add_edge(e);
        }
        g
    }

    /// Add an edge to the graph. \returns the index of the edge.
    pub fn add_edge(&mut self, edge: E) -> usize {
        let n = self.out_edges.len();
        assert!(edge.source() < n && edge.target() < n, "Invalid edge");
        let idx = self.edges.len();
        self.out_edges[edge.source()].push(idx);
        self.in_edges[edge.target()].push(idx);
        self.edges.push(edge);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.out_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[E] {
        &self.edges
    }

    pub fn edge(&self, idx: usize) -> &E {
        &self.edges[idx]
    }

    /// \returns the indices of the edges that leave \p node.
    pub fn out_edges(&self, node: usize) -> &[usize] {
        &self.out_edges[node]
    }

    /// \returns the indices of the edges that enter \p node.
    pub fn in_edges(&self, node: usize) -> &[usize] {
        &self.in_edges[node]
    }

    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.out_edges[node]
            .iter()
            .map(move |e| self.edges[*e].target())
    }

    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.in_edges[node]
            .iter()
            .map(move |e| self.edges[*e].source())
    }

    /// \returns the edges that touch \p node, ignoring the direction, as
    /// pairs of (edge index, the other endpoint).
    pub fn incident_edges(
        &self,
        node: usize,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        let outs = self.out_edges[node]
            .iter()
            .map(move |e| (*e, self.edges[*e].target()));
        let ins = self.in_edges[node]
            .iter()
            .map(move |e| (*e, self.edges[*e].source()));
        outs.chain(ins)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Unvisited,
    InProgress,
    Done,
}

/// The result of a depth first search over the whole graph.
#[derive(Debug, Clone, Default)]
pub struct DfsResult {
    /// The nodes in the order in which they were completed.
    pub post_order: Vec<usize>,
    /// Edges that point to a node that is on the dfs stack.
    pub back_edges: Vec<usize>,
}

/// Run a depth first search from every unvisited node, in index order. Nodes
/// are colored unvisited, in-progress and done. An edge that reaches an
/// in-progress node closes a cycle, and is recorded as a back edge.
pub fn depth_first_search<E: GraphEdge>(graph: &BasicGraphOnEdges<E>) -> DfsResult {
    let n = graph.node_count();
    let mut color = vec![Color::Unvisited; n];
    let mut res = DfsResult::default();

    // A stack of (node, the next out edge to scan).
    let mut worklist: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if color[root] != Color::Unvisited {
            continue;
        }
        color[root] = Color::InProgress;
        worklist.push((root, 0));

        while let Some((node, cursor)) = worklist.last_mut() {
            let node = *node;
            let outs = graph.out_edges(node);
            if *cursor == outs.len() {
                // All of the children are handled.
                worklist.pop();
                color[node] = Color::Done;
                res.post_order.push(node);
                continue;
            }

            let edge = outs[*cursor];
            *cursor += 1;
            let next = graph.edge(edge).target();
            match color[next] {
                Color::Unvisited => {
                    color[next] = Color::InProgress;
                    worklist.push((next, 0));
                }
                Color::InProgress => res.back_edges.push(edge),
                Color::Done => {}
            }
        }
    }
    res
}

/// \returns True if the graph has a directed cycle. Self edges are cycles.
pub fn has_cycle<E: GraphEdge>(graph: &BasicGraphOnEdges<E>) -> bool {
    !depth_first_search(graph).back_edges.is_empty()
}

/// \returns an order of the nodes in which every edge points forward, or
/// None if the graph has a cycle. This is the reverse post order.
pub fn topological_order<E: GraphEdge>(graph: &BasicGraphOnEdges<E>) -> Option<Vec<usize>> {
    let res = depth_first_search(graph);
    if !res.back_edges.is_empty() {
        return None;
    }
    let mut order = res.post_order;
    order.reverse();
    Some(order)
}

/// \returns the indices of a set of edges that break every cycle in the
/// graph when they are reversed (or removed). These are the back edges of a
/// depth first search, so every edge that is not in the set goes from a
/// later to an earlier node in the post order.
pub fn feedback_edges<E: GraphEdge>(graph: &BasicGraphOnEdges<E>) -> Vec<usize> {
    depth_first_search(graph).back_edges
}

/// \returns the connected components of the graph, ignoring the direction of
/// the edges. Each component is sorted, and the components are sorted by
/// their lowest node.
pub fn connected_components<E: GraphEdge>(graph: &BasicGraphOnEdges<E>) -> Vec<Vec<usize>> {
    let n = graph.node_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    let mut worklist = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        let mut component = Vec::new();
        visited[root] = true;
        worklist.push(root);
        while let Some(node) = worklist.pop() {
            component.push(node);
            for (_, other) in graph.incident_edges(node) {
                if !visited[other] {
                    visited[other] = true;
                    worklist.push(other);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

/// Computes a minimum spanning tree with Prim's algorithm, treating the edges
/// as undirected. The tree grows from \p root; when the graph is not
/// connected the search restarts from the lowest unreached node, so the
/// result is a spanning forest. Ties are broken by the edge index.
/// \returns the indices of the tree edges, in the order they were added.
pub fn minimum_spanning_tree<E, F>(
    graph: &BasicGraphOnEdges<E>,
    weight: F,
    root: usize,
) -> Vec<usize>
where
    E: GraphEdge,
    F: Fn(usize) -> f64,
{
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    assert!(root < n, "Invalid root");

    let mut in_tree = vec![false; n];
    let mut tree = Vec::new();
    // The frontier maps nodes to the cheapest (weight, edge) that reaches them.
    let mut frontier = GenericBinaryHeapPriorityQueue::new(
        |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)),
    );

    let starts = std::iter::once(root).chain(0..n);
    for start in starts {
        if in_tree[start] {
            continue;
        }
        in_tree[start] = true;
        relax_frontier(graph, &weight, start, &in_tree, &mut frontier);

        while let Some((node, (_, edge))) = frontier.dequeue_with_priority() {
            in_tree[node] = true;
            tree.push(edge);
            relax_frontier(graph, &weight, node, &in_tree, &mut frontier);
        }
    }
    tree
}

fn relax_frontier<E, F, C>(
    graph: &BasicGraphOnEdges<E>,
    weight: &F,
    node: usize,
    in_tree: &[bool],
    frontier: &mut GenericBinaryHeapPriorityQueue<usize, (f64, usize), C>,
) where
    E: GraphEdge,
    F: Fn(usize) -> f64,
    C: Fn(&(f64, usize), &(f64, usize)) -> std::cmp::Ordering,
{
    for (edge, other) in graph.incident_edges(node) {
        if in_tree[other] {
            continue;
        }
        let key = (weight(edge), edge);
        match frontier.priority_of(&other) {
            None => frontier.enqueue(other, key),
            Some(&current) => {
                if key.0 < current.0 || (key.0 == current.0 && key.1 < current.1) {
                    frontier.decrease_priority(&other, key);
                }
            }
        }
    }
}

#[test]
fn test_topological_sort() {
    let g = BasicGraphOnEdges::from_edges(5, vec![(0, 1), (1, 2), (1, 3), (3, 4), (4, 1)]);
    assert!(has_cycle(&g));
    assert!(topological_order(&g).is_none());

    for edges in [vec![(0, 1), (1, 2), (0, 2)], vec![(1, 0), (2, 1), (2, 0)]] {
        let g = BasicGraphOnEdges::from_edges(3, edges.clone());
        assert!(!has_cycle(&g));
        let order = topological_order(&g).unwrap();
        let mut pos = vec![0; 3];
        for (i, n) in order.iter().enumerate() {
            pos[*n] = i;
        }
        for (a, b) in edges {
            assert!(pos[a] < pos[b]);
        }
    }
}

#[test]
fn test_feedback_edges() {
    let edges = vec![(0, 1), (1, 2), (2, 0), (2, 3), (3, 1), (3, 3)];
    let g = BasicGraphOnEdges::from_edges(4, edges.clone());
    let back = feedback_edges(&g);
    assert!(!back.is_empty());
    // Reversing the back edges (and dropping self edges) leaves a dag.
    let mut fixed = BasicGraphOnEdges::new(4);
    for (i, (a, b)) in edges.iter().enumerate() {
        if a == b {
            continue;
        }
        if back.contains(&i) {
            fixed.add_edge((*b, *a));
        } else {
            fixed.add_edge((*a, *b));
        }
    }
    assert!(!has_cycle(&fixed));
}

#[test]
fn test_minimum_spanning_tree() {
    // A 4-cycle with a heavier diagonal.
    let edges = vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)];
    let weights = [1., 1., 1., 1., 2.];
    let g = BasicGraphOnEdges::from_edges(4, edges.clone());
    let tree = minimum_spanning_tree(&g, |e| weights[e], 0);
    assert_eq!(tree.len(), 3);
    assert!(!tree.contains(&4));
    let mut seen = vec![false; 4];
    for e in tree {
        seen[edges[e].0] = true;
        seen[edges[e].1] = true;
    }
    assert!(seen.iter().all(|x| *x));
}

#[test]
fn test_connected_components() {
    let g = BasicGraphOnEdges::from_edges(6, vec![(0, 1), (2, 1), (3, 4)]);
    let cc = connected_components(&g);
    assert_eq!(cc, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
    // The forest spans each component.
    let tree = minimum_spanning_tree(&g, |_| 1., 3);
    assert_eq!(tree.len(), 3);
}
