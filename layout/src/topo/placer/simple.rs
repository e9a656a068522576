//! This is a simple pass that just places the boxes in a row, one after the
//! other, and stacks the rows.

use super::EPSILON;
use crate::core::config::LayoutConfig;
use crate::topo::layout::LayeredGraph;

/// \returns the height of the tallest element in each row.
pub fn row_heights(vg: &LayeredGraph) -> Vec<f64> {
    let mut heights = Vec::with_capacity(vg.dag.num_levels());
    for i in 0..vg.dag.num_levels() {
        let mut max_height: f64 = 0.;
        for idx in vg.dag.row(i).iter() {
            max_height = max_height.max(vg.size(*idx).y);
        }
        heights.push(max_height);
    }
    heights
}

/// Assign the initial Y coordinates. All of the elements in a row share the
/// same center.
fn assign_y_coordinates(vg: &mut LayeredGraph, layer_separation: f64) {
    let heights = row_heights(vg);
    let mut lowest_point = 0.;
    for (i, max_height) in heights.iter().enumerate() {
        let new_center = lowest_point + max_height / 2.;
        for idx in vg.dag.row(i).clone().iter() {
            vg.pos_mut(*idx).y = new_center;
        }
        lowest_point += max_height + layer_separation;
    }
}

/// Assign the initial x coordinates based on the natural ordering in the
/// rank.
fn assign_x_coordinates(vg: &mut LayeredGraph, node_separation: f64) {
    for i in 0..vg.dag.num_levels() {
        let mut rightmost_point = 0.;
        for idx in vg.dag.row(i).clone().iter() {
            let width = vg.size(*idx).x;
            vg.pos_mut(*idx).x = rightmost_point + width / 2. + EPSILON;
            rightmost_point += width + node_separation + EPSILON;
        }
    }
}

pub fn do_it(vg: &mut LayeredGraph, config: &LayoutConfig) {
    // Adjust the boxes within the line (along y).
    assign_y_coordinates(vg, config.layer_separation);

    // Assign X coordinates. Using the rank order from the topological sort
    // is a good starting point.
    assign_x_coordinates(vg, config.node_separation);
}
