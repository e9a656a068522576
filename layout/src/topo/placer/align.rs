//! Coordinate refinement with the projection solver. The rows are stacked
//! with separation constraints and each row is aligned with equality
//! constraints. Along the rows, the nodes are pulled toward the median of
//! their neighbors while the order of the row and the node gaps are kept.

use super::{ALIGN_ROUNDS, CONNECTOR_WEIGHT, EPSILON};
use crate::adt::dag::NodeHandle;
use crate::core::base::Direction;
use crate::core::error::Result;
use crate::core::geometry::weighted_median;
use crate::solver::{Solver, VariableId};
use crate::topo::layout::LayeredGraph;

use super::simple::row_heights;

/// Assign the y coordinates of the rows.
pub fn assign_y_coordinates(vg: &mut LayeredGraph, layer_separation: f64) -> Result<()> {
    let heights = row_heights(vg);
    let mut solver = Solver::new();
    let mut vars: Vec<Option<VariableId>> = vec![None; vg.num_nodes()];
    for node in vg.iter_nodes() {
        vars[node.get_index()] = Some(solver.add_variable(vg.pos(node).y, 1.)?);
    }
    let var = |n: NodeHandle| -> VariableId {
        let Some(v) = vars[n.get_index()] else {
            panic!("Node without a variable");
        };
        v
    };

    // The first node of the previous non-empty row, and its height.
    let mut prev: Option<(NodeHandle, f64)> = None;
    for (i, height) in heights.iter().enumerate() {
        let row = vg.dag.row(i);
        let Some(first) = row.first() else {
            continue;
        };
        for other in row.iter().skip(1) {
            solver.add_constraint(var(*first), var(*other), 0., true)?;
        }
        if let Some((p, prev_height)) = prev {
            let gap = prev_height / 2. + height / 2. + layer_separation;
            solver.add_constraint(var(p), var(*first), gap, false)?;
        }
        prev = Some((*first, *height));
    }
    solver.solve()?;

    for node in vg.iter_nodes() {
        vg.pos_mut(node).y = solver.position(var(node));
    }
    Ok(())
}

/// \returns the position that the node \p node wants to be at, and the
/// weight of the wish. The neighbors that are considered depend on \p dir.
fn desired_x(vg: &LayeredGraph, node: NodeHandle, dir: Direction) -> (f64, f64) {
    let mut xs = Vec::new();
    if dir.is_down() {
        xs.extend(vg.preds(node).iter().map(|n| vg.pos(*n).x));
    }
    if dir.is_up() {
        xs.extend(vg.succ(node).iter().map(|n| vg.pos(*n).x));
    }
    let weight = if vg.is_connector(node) {
        CONNECTOR_WEIGHT
    } else {
        1.
    };
    if xs.is_empty() {
        // Nodes with no neighbors in this direction stay where they are.
        return (vg.pos(node).x, weight * 0.1);
    }
    (weighted_median(&xs), weight)
}

/// Align the nodes of the row \p row_idx with their neighbors, in a fresh
/// solver. \returns the largest move.
fn align_row(
    vg: &mut LayeredGraph,
    row_idx: usize,
    node_separation: f64,
    dir: Direction,
) -> Result<f64> {
    let row = vg.dag.row(row_idx).clone();
    let mut solver = Solver::new();
    let mut vars = Vec::with_capacity(row.len());
    for node in row.iter() {
        let (desired, weight) = desired_x(vg, *node, dir);
        vars.push(solver.add_variable(desired, weight)?);
    }
    for i in 1..row.len() {
        let (a, b) = (row[i - 1], row[i]);
        let gap = (vg.size(a).x + vg.size(b).x) / 2. + node_separation;
        solver.add_constraint(vars[i - 1], vars[i], gap, false)?;
    }
    solver.solve()?;

    let mut max_move: f64 = 0.;
    for (node, var) in row.iter().zip(vars.iter()) {
        let x = solver.position(*var);
        max_move = max_move.max((x - vg.pos(*node).x).abs());
        vg.pos_mut(*node).x = x;
    }
    Ok(max_move)
}

/// Run one sweep of the x refinement over the rows. Sweeping down aligns
/// each row with the row above it, after that row was moved. \returns the
/// largest move.
fn align_round(vg: &mut LayeredGraph, node_separation: f64, dir: Direction) -> Result<f64> {
    let num_rows = vg.dag.num_levels();
    let rows: Vec<usize> = match dir {
        Direction::Down => (1..num_rows).collect(),
        Direction::Up => (0..num_rows.saturating_sub(1)).rev().collect(),
        Direction::Both => (0..num_rows).collect(),
        Direction::None => Vec::new(),
    };
    let mut max_move: f64 = 0.;
    for row_idx in rows {
        max_move = max_move.max(align_row(vg, row_idx, node_separation, dir)?);
    }
    Ok(max_move)
}

/// Assign the x coordinates: alternate between aligning nodes with the
/// rows above and below, and finish with a round that considers both.
pub fn assign_x_coordinates(vg: &mut LayeredGraph, node_separation: f64) -> Result<()> {
    for i in 0..ALIGN_ROUNDS {
        let dir = if i + 1 == ALIGN_ROUNDS {
            Direction::Both
        } else if i % 2 == 0 {
            Direction::Down
        } else {
            Direction::Up
        };
        let max_move = align_round(vg, node_separation, dir)?;
        #[cfg(feature = "log")]
        log::debug!("Alignment round {} moved nodes by up to {:.3}", i, max_move);
        if max_move < EPSILON {
            break;
        }
    }
    Ok(())
}
