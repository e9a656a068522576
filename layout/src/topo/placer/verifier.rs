use super::EPSILON;
use crate::topo::layout::LayeredGraph;

pub fn do_it(vg: &LayeredGraph) {
    verify_order_in_rank(vg);
    verify_rows_are_stacked(vg);
}

/// Check that the spatial order of the boxes matches the order in the rank,
/// and that boxes in the same row don't intersect.
fn verify_order_in_rank(vg: &LayeredGraph) {
    for row in 0..vg.dag.num_levels() {
        let current_row = vg.dag.row(row);
        for pair in current_row.windows(2) {
            let bb0 = vg.bbox(pair[0]);
            let bb1 = vg.bbox(pair[1]);
            assert!(
                bb0.right() <= bb1.left() + EPSILON,
                "Boxes must not intersect"
            );
            assert!(
                bb0.center().x < bb1.center().x,
                "The order of the boxes must be sequential on the x axis"
            );
        }
    }
}

/// Check that each row is below the previous row.
fn verify_rows_are_stacked(vg: &LayeredGraph) {
    let mut prev_bottom = f64::NEG_INFINITY;
    for row in 0..vg.dag.num_levels() {
        let current_row = vg.dag.row(row);
        if current_row.is_empty() {
            continue;
        }
        let mut top = f64::INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for node in current_row.iter() {
            let bb = vg.bbox(*node);
            top = top.min(bb.top());
            bottom = bottom.max(bb.bottom());
        }
        assert!(prev_bottom <= top + EPSILON, "Rows must not overlap");
        prev_bottom = bottom;
    }
}
