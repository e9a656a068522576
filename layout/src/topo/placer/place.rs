//! This module contains the implementation of the placer, which assigns the
//! final (x,y) coordinates to all of the elements in the graph.

use crate::core::config::LayoutConfig;
use crate::core::error::Result;
use crate::topo::layout::LayeredGraph;

use crate::topo::placer::align;
use crate::topo::placer::simple;
use crate::topo::placer::verifier;

pub struct Placer<'a> {
    vg: &'a mut LayeredGraph,
    config: &'a LayoutConfig,
}

impl<'a> Placer<'a> {
    pub fn new(vg: &'a mut LayeredGraph, config: &'a LayoutConfig) -> Self {
        Self { vg, config }
    }

    pub fn layout(&mut self) -> Result<()> {
        #[cfg(feature = "log")]
        log::info!("Starting layout of {} nodes. ", self.vg.num_nodes());
        if self.vg.num_nodes() == 0 {
            return Ok(());
        }

        // We implement left-to-right layout by transposing the graph.
        let orientation = self.vg.orientation();
        let need_transpose = orientation.is_left_right();
        if need_transpose {
            #[cfg(feature = "log")]
            log::info!("Placing nodes in Left-to-right mode.");
            self.vg.transpose();
        } else {
            #[cfg(feature = "log")]
            log::info!("Placing nodes in Top-to-Bottom mode.");
        }

        // Stack the rows and assign consecutive X coordinates.
        simple::do_it(self.vg, self.config);

        // Check that the spatial order of the blocks matches the order in the
        // rank.
        verifier::do_it(self.vg);

        align::assign_y_coordinates(self.vg, self.config.layer_separation)?;
        align::assign_x_coordinates(self.vg, self.config.node_separation)?;

        verifier::do_it(self.vg);

        // Finalize left-to-right graphs.
        if need_transpose {
            self.vg.transpose();
        }
        if orientation.is_reversed() {
            self.vg.mirror(need_transpose);
        }
        self.vg.normalize();
        Ok(())
    }
}

#[cfg(test)]
use crate::adt::dag::NodeHandle;
#[cfg(test)]
use crate::core::base::Orientation;
#[cfg(test)]
use crate::core::geometry::Point;

#[cfg(test)]
fn place_diamond(orientation: Orientation) -> (LayeredGraph, Vec<NodeHandle>) {
    let mut g = LayeredGraph::new(orientation);
    let h: Vec<NodeHandle> = (0..4).map(|_| g.add_node(Point::new(20., 10.))).collect();
    g.add_edge(h[0], h[1], None);
    g.add_edge(h[0], h[2], None);
    g.add_edge(h[1], h[3], None);
    g.add_edge(h[2], h[3], None);
    let config = LayoutConfig::default();
    let res = g.do_it(&config);
    assert!(res.is_ok());
    (g, h)
}

#[test]
fn test_place_top_to_bottom() {
    let (g, h) = place_diamond(Orientation::TopToBottom);
    let config = LayoutConfig::default();
    // The layers are stacked with the layer separation.
    let dy = g.pos(h[1]).y - g.pos(h[0]).y;
    assert!((dy - (10. + config.layer_separation)).abs() < 1e-6);
    assert!((g.pos(h[1]).y - g.pos(h[2]).y).abs() < 1e-6);
    // The middle row is separated.
    let dx = (g.pos(h[2]).x - g.pos(h[1]).x).abs();
    assert!(dx >= 20. + config.node_separation - 1e-6);
    // The source and the sink are centered above and below the middle row.
    let mid = (g.pos(h[1]).x + g.pos(h[2]).x) / 2.;
    assert!((g.pos(h[0]).x - mid).abs() < 1.);
    assert!((g.pos(h[3]).x - mid).abs() < 1.);
    // The drawing starts at the origin.
    let left = h.iter().map(|n| g.bbox(*n).left()).fold(f64::INFINITY, f64::min);
    let top = h.iter().map(|n| g.bbox(*n).top()).fold(f64::INFINITY, f64::min);
    assert!(left.abs() < 1e-6 && top.abs() < 1e-6);
}

#[test]
fn test_place_directions() {
    let (g, h) = place_diamond(Orientation::LeftToRight);
    assert!(g.pos(h[0]).x < g.pos(h[1]).x);
    assert!(g.pos(h[1]).x < g.pos(h[3]).x);
    // The node sizes are kept.
    assert_eq!(g.size(h[0]), Point::new(20., 10.));

    let (g, h) = place_diamond(Orientation::BottomToTop);
    assert!(g.pos(h[0]).y > g.pos(h[1]).y);

    let (g, h) = place_diamond(Orientation::RightToLeft);
    assert!(g.pos(h[0]).x > g.pos(h[3]).x);
}
