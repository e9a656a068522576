//! This module contains optimization passes that transform the graphs in different
//! phases of the program. Here you can find things like optimizations for
//! sinking or hoisting nodes to reduce the number of live edges, and
//! optimizations that move nodes within a row to reduce edge crossing.

use crate::adt::dag::NodeHandle;
use crate::adt::dag::DAG;
use crate::core::base::Direction;
use crate::core::geometry::weighted_median;

/// This optimizations changes the order of nodes within a rank (ordering along
/// the x-axis). The transformation tries to reduce the number of edges that
/// cross each other.
pub struct EdgeCrossOptimizer<'a> {
    dag: &'a mut DAG,
    /// The number of sweeps to perform.
    passes: usize,
}

impl<'a> EdgeCrossOptimizer<'a> {
    pub fn new(dag: &'a mut DAG, passes: usize) -> Self {
        Self { dag, passes }
    }

    /// Given two nodes that may have connections in \p row, check how many of
    /// these edges intersect. Check both successors and predecessors.
    ///               A   B
    ///             /   \/ \
    ///            /    /\  \
    ///  Row: [][][][][][][][][][]
    fn num_crossing(
        &self,
        a: NodeHandle,
        b: NodeHandle,
        row: &[NodeHandle],
    ) -> usize {
        let mut sum = 0;
        // Record the number of edges that previously connected with node B.
        let mut num_b = 0;

        let a_edges1 = self.dag.successors(a);
        let a_edges2 = self.dag.predecessors(a);
        let b_edges1 = self.dag.successors(b);
        let b_edges2 = self.dag.predecessors(b);

        for node in row {
            let is_a1 = a_edges1.iter().any(|x| x == node);
            let is_a2 = a_edges2.iter().any(|x| x == node);
            let is_b1 = b_edges1.iter().any(|x| x == node);
            let is_b2 = b_edges2.iter().any(|x| x == node);
            if is_a1 || is_a2 {
                sum += num_b;
            }
            if is_b1 || is_b2 {
                num_b += 1;
            }
        }
        sum
    }

    /// \returns the index of each node within its row.
    fn positions_in_rows(&self) -> Vec<usize> {
        let mut pos = vec![0; self.dag.len()];
        for row in self.dag.ranks() {
            for (i, node) in row.iter().enumerate() {
                pos[node.get_index()] = i;
            }
        }
        pos
    }

    /// Reorder the row \p row_idx by the median position of the neighbors of
    /// each node in the adjacent row. Sweeping down uses the predecessors and
    /// sweeping up uses the successors. Nodes without neighbors in the
    /// adjacent row keep their current position.
    fn median_sort_row(&mut self, row_idx: usize, dir: Direction, pos: &[usize]) {
        let row = self.dag.row(row_idx).clone();
        if row.len() < 2 {
            return;
        }
        let mut keyed: Vec<(f64, NodeHandle)> = Vec::with_capacity(row.len());
        for (i, node) in row.iter().enumerate() {
            let neighbors = if dir.is_down() {
                self.dag.predecessors(*node)
            } else {
                self.dag.successors(*node)
            };
            let values: Vec<f64> =
                neighbors.iter().map(|n| pos[n.get_index()] as f64).collect();
            let key = if values.is_empty() {
                i as f64
            } else {
                weighted_median(&values)
            };
            keyed.push((key, *node));
        }
        // The sort is stable, so ties keep their relative order.
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        *self.dag.row_mut(row_idx) = keyed.iter().map(|x| x.1).collect();
    }

    /// Perform one median sweep over all of the rows, in the direction
    /// \p dir.
    fn median_sweep(&mut self, dir: Direction) {
        let num_rows = self.dag.num_levels();
        if num_rows < 2 {
            return;
        }
        if dir.is_down() {
            for i in 1..num_rows {
                let pos = self.positions_in_rows();
                self.median_sort_row(i, dir, &pos);
            }
        } else {
            for i in (0..num_rows - 1).rev() {
                let pos = self.positions_in_rows();
                self.median_sort_row(i, dir, &pos);
            }
        }
    }

    pub fn optimize(&mut self) {
        self.dag.verify();
        if self.dag.num_levels() < 2 {
            return;
        }
        #[cfg(feature = "log")]
        log::info!("Optimizing edge crossing.");
        let mut best_rank = self.dag.ranks().clone();
        let mut best_cnt = self.count_crossed_edges();
        #[cfg(feature = "log")]
        log::info!("Starting with {} crossings.", best_cnt);
        for i in 0..self.passes {
            if best_cnt == 0 {
                break;
            }
            let dir = if i % 2 == 0 {
                Direction::Down
            } else {
                Direction::Up
            };
            self.median_sweep(dir);
            self.swap_crossed_edges(Direction::Both);
            let new_cnt = self.count_crossed_edges();
            if new_cnt < best_cnt {
                #[cfg(feature = "log")]
                log::debug!("Found a rank with {} crossings.", new_cnt);
                best_rank = self.dag.ranks().clone();
                best_cnt = new_cnt;
            }
        }
        #[cfg(feature = "log")]
        log::info!("Finished with {} crossings.", best_cnt);
        *self.dag.ranks_mut() = best_rank;
    }

    /// \returns the number of edge crossings between all of the adjacent
    /// rows.
    pub fn count_crossed_edges(&self) -> usize {
        let pos = self.positions_in_rows();
        let mut sum = 0;
        // Compare each row to the row afterwards.
        for row_idx in 0..self.dag.num_levels().saturating_sub(1) {
            let first_row = self.dag.row(row_idx);
            let second_row = self.dag.row(row_idx + 1);
            sum += self.count_crossing_in_rows(first_row, second_row, &pos);
        }
        sum
    }

    /// Count the crossings of the edges between \p first and \p second, by
    /// counting the inversions in the list of edge endpoints.
    fn count_crossing_in_rows(
        &self,
        first: &[NodeHandle],
        second: &[NodeHandle],
        pos: &[usize],
    ) -> usize {
        if first.len() < 2 && second.len() < 2 {
            return 0;
        }
        let mut edges = Vec::new();
        for node in first {
            for succ in self.dag.successors(*node) {
                if second.contains(succ) {
                    edges.push((pos[node.get_index()], pos[succ.get_index()]));
                }
            }
        }
        edges.sort();

        // A Fenwick tree over the positions in the second row.
        let mut tree = vec![0usize; second.len() + 1];
        let mut sum = 0;
        for (seen, (_, to)) in edges.iter().enumerate() {
            let mut not_after = 0;
            let mut i = to + 1;
            while i > 0 {
                not_after += tree[i];
                i -= i & i.wrapping_neg();
            }
            sum += seen - not_after;
            let mut i = to + 1;
            while i < tree.len() {
                tree[i] += 1;
                i += i & i.wrapping_neg();
            }
        }
        sum
    }

    /// Scan all of the node pairs in the module and count the number of crossed
    /// edges. Swap adjacent nodes if it reduces the number of crossing.
    fn swap_crossed_edges(&mut self, dir: Direction) {
        let mut changed = true;
        let mut iterations = 0;
        while changed && iterations < self.dag.len() {
            changed = false;
            iterations += 1;
            if dir.is_down() {
                for i in 0..self.dag.num_levels() {
                    changed |= self.swap_crossed_edges_on_row(i, dir);
                }
            }
            if dir.is_up() {
                for i in (0..self.dag.num_levels()).rev() {
                    changed |= self.swap_crossed_edges_on_row(i, dir);
                }
            }
        }
    }

    /// See swap_crossed_edges.
    fn swap_crossed_edges_on_row(
        &mut self,
        row_idx: usize,
        dir: Direction,
    ) -> bool {
        let mut changed = false;

        let num_rows = self.dag.num_levels();

        let prev_row = if row_idx > 0 && dir.is_up() {
            self.dag.row(row_idx - 1).clone()
        } else {
            Vec::new()
        };
        let next_row = if row_idx + 1 < num_rows && dir.is_down() {
            self.dag.row(row_idx + 1).clone()
        } else {
            Vec::new()
        };

        let mut row = self.dag.row(row_idx).clone();

        if row.len() < 2 {
            return false;
        }

        // For each two consecutive elements in the row:
        for i in 0..row.len() - 1 {
            let a = row[i];
            let b = row[i + 1];

            let mut ab = 0;
            let mut ba = 0;
            // Figure out if A crosses the edges of B, and vice versa, on both
            // the edges pointing up and down.
            ab += self.num_crossing(a, b, &prev_row);
            ba += self.num_crossing(b, a, &prev_row);
            ab += self.num_crossing(a, b, &next_row);
            ba += self.num_crossing(b, a, &next_row);

            // Swap the edges.
            if ab > ba {
                row[i] = b;
                row[i + 1] = a;
                changed = true;
            }
        }

        if changed {
            *self.dag.row_mut(row_idx) = row;
        }
        changed
    }
}

/// This optimization sinks nodes in an attempt to shorten the length of edges
/// that run through the graph.
pub struct RankOptimizer<'a> {
    dag: &'a mut DAG,
}

impl<'a> RankOptimizer<'a> {
    pub fn new(dag: &'a mut DAG) -> Self {
        Self { dag }
    }

    pub fn try_to_sink_node(&mut self, node: NodeHandle) -> bool {
        let backs = self.dag.predecessors(node);
        let fwds = self.dag.successors(node);

        // Don't try to sink if we increase the number of live edges,
        // or if there are no forward edges.
        if backs.len() > fwds.len() || fwds.is_empty() {
            return false;
        }

        let curr_rank = self.dag.level(node);
        let mut highest_next = self.dag.len();
        for elem in fwds {
            let next_rank = self.dag.level(*elem);
            highest_next = highest_next.min(next_rank);
        }

        // We found an opportunity to sink a node.
        if highest_next > curr_rank + 1 {
            self.dag.update_node_rank_level(node, highest_next - 1);
            return true;
        }
        false
    }

    // Try to sink nodes to shorten the length of edges.
    pub fn optimize(&mut self) {
        self.dag.verify();

        #[cfg(feature = "log")]
        log::info!("Optimizing the ranks.");
        #[cfg(feature = "log")]
        let mut cnt = 0;
        #[cfg(feature = "log")]
        let mut iter = 0;

        loop {
            let mut c = 0;
            for node in self.dag.iter() {
                if self.try_to_sink_node(node) {
                    c += 1;
                }
            }
            #[cfg(feature = "log")]
            {
                cnt += c;
                iter += 1;
            }
            if c == 0 {
                break;
            }
        }

        #[cfg(feature = "log")]
        log::info!("Sank {} nodes in {} iteration.", cnt, iter);
    }
}

#[cfg(test)]
fn make_dag(num_nodes: usize, edges: &[(usize, usize)]) -> (DAG, Vec<NodeHandle>) {
    let mut dag = DAG::new();
    let h: Vec<NodeHandle> = (0..num_nodes).map(|_| dag.new_node()).collect();
    for (from, to) in edges {
        dag.add_edge(h[*from], h[*to]);
    }
    dag.recompute_node_ranks();
    (dag, h)
}

#[test]
fn test_count_crossings() {
    // Two sources and two sinks, connected with an X.
    let (mut dag, h) = make_dag(4, &[(0, 3), (1, 2)]);
    *dag.row_mut(0) = vec![h[0], h[1]];
    *dag.row_mut(1) = vec![h[2], h[3]];
    let opt = EdgeCrossOptimizer::new(&mut dag, 4);
    assert_eq!(opt.count_crossed_edges(), 1);

    // A complete bipartite graph K(3,3) with a given order.
    let mut edges = Vec::new();
    for a in 0..3 {
        for b in 3..6 {
            edges.push((a, b));
        }
    }
    let (mut dag, _) = make_dag(6, &edges);
    let opt = EdgeCrossOptimizer::new(&mut dag, 4);
    // Each pair of sources crosses 3 times.
    assert_eq!(opt.count_crossed_edges(), 9);
}

#[test]
fn test_remove_crossings() {
    // Two parallel chains whose middle rows are swapped.
    let (mut dag, h) = make_dag(6, &[(0, 2), (2, 4), (1, 3), (3, 5)]);
    *dag.row_mut(1) = vec![h[3], h[2]];
    let mut opt = EdgeCrossOptimizer::new(&mut dag, 8);
    assert_eq!(opt.count_crossed_edges(), 2);
    opt.optimize();
    assert_eq!(opt.count_crossed_edges(), 0);
    dag.verify();
}

#[test]
fn test_sink_nodes() {
    // Node 1 feeds 3 and 4 that are deep in the graph. It has no
    // predecessors, so it sinks to the level above them.
    let (mut dag, h) = make_dag(5, &[(0, 2), (2, 3), (3, 4), (1, 3), (1, 4)]);
    assert_eq!(dag.level(h[1]), 0);
    RankOptimizer::new(&mut dag).optimize();
    assert_eq!(dag.level(h[1]), 1);
    dag.verify();
}
