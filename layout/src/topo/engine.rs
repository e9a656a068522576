//! The top level driver of the layout engine. It places the nodes with the
//! configured algorithm, wraps the clusters around their members and routes
//! the edges around the nodes and the clusters.

use super::graph::{GeometryGraph, LayoutResult, NodeShape};
use super::layout::LayeredGraph;
use super::mds::mds_layout;
use crate::adt::dag::NodeHandle;
use crate::core::config::{Algorithm, LayoutConfig};
use crate::core::curve::Curve;
use crate::core::error::{LayoutError, Result};
use crate::core::geometry::{Point, Rectangle};
use crate::routing::{ClusterBox, EdgeRouter, Obstacle};

/// Place the nodes with the layered algorithm.
/// \returns the node centers and the boxes of the edge labels.
fn layered_positions(
    g: &GeometryGraph,
    config: &LayoutConfig,
) -> Result<(Vec<Point>, Vec<Option<Rectangle>>)> {
    let mut lg = LayeredGraph::new(config.direction);
    let handles: Vec<NodeHandle> = g.nodes().iter().map(|n| lg.add_node(n.size)).collect();
    for e in g.edges() {
        lg.add_edge(handles[e.source], handles[e.target], e.label);
    }
    lg.do_it(config)?;
    let centers = handles.iter().map(|h| lg.pos(*h)).collect();
    let labels = (0..g.num_edges()).map(|i| lg.label_box(i)).collect();
    Ok((centers, labels))
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    InProgress,
    Done,
}

/// Compute the box of the cluster \p idx, and of its sub-clusters.
fn cluster_box(
    g: &GeometryGraph,
    nodes: &[Rectangle],
    idx: usize,
    state: &mut Vec<Visit>,
    boxes: &mut Vec<Rectangle>,
) -> Result<()> {
    state[idx] = Visit::InProgress;
    let cluster = &g.clusters()[idx];
    let mut bbox = Rectangle::empty();
    for n in cluster.nodes.iter() {
        bbox = bbox.union(&nodes[*n]);
    }
    for sub in cluster.clusters.iter() {
        match state[*sub] {
            Visit::InProgress => {
                return Err(LayoutError::CyclicHierarchy {
                    child: idx,
                    parent: *sub,
                })
            }
            Visit::New => cluster_box(g, nodes, *sub, state, boxes)?,
            Visit::Done => {}
        }
        if !boxes[*sub].is_empty() {
            bbox = bbox.union(&boxes[*sub]);
        }
    }
    boxes[idx] = if bbox.is_empty() {
        bbox
    } else {
        bbox.pad(cluster.padding)
    };
    state[idx] = Visit::Done;
    Ok(())
}

/// \returns the box of each cluster, which contains the boxes of its members
/// with the padding of the cluster. Empty clusters get an empty box.
pub fn cluster_boxes(g: &GeometryGraph, nodes: &[Rectangle]) -> Result<Vec<Rectangle>> {
    let num = g.clusters().len();
    let mut state = vec![Visit::New; num];
    let mut boxes = vec![Rectangle::empty(); num];
    for idx in 0..num {
        if state[idx] == Visit::New {
            cluster_box(g, nodes, idx, &mut state, &mut boxes)?;
        }
    }
    Ok(boxes)
}

/// Samples per curve segment when looking for the nearest point to a label.
const LABEL_SAMPLES: usize = 16;

/// \returns the box \p label if its center is within half its size of
/// \p curve, or the same box centered on the nearest point of the curve.
fn attach_label(label: Rectangle, curve: &Curve) -> Rectangle {
    let center = label.center();
    let Some(near) = curve.nearest_point(center, LABEL_SAMPLES) else {
        return label;
    };
    let reach = label.width().max(label.height()) / 2.;
    if near.distance_to(center) <= reach {
        return label;
    }
    Rectangle::from_center(near, label.size())
}

/// Lay out the graph \p g with the configuration \p config.
pub fn layout(g: &GeometryGraph, config: &LayoutConfig) -> Result<LayoutResult> {
    g.verify();
    #[cfg(feature = "log")]
    log::info!(
        "Layout of {} nodes, {} edges and {} clusters ({:?})",
        g.num_nodes(),
        g.num_edges(),
        g.clusters().len(),
        config.algorithm
    );

    let (centers, mut labels) = if g.num_nodes() == 0 {
        (Vec::new(), vec![None; g.num_edges()])
    } else {
        match config.algorithm {
            Algorithm::Layered => layered_positions(g, config)?,
            Algorithm::Mds => (mds_layout(g, config)?, vec![None; g.num_edges()]),
        }
    };

    let nodes: Vec<Rectangle> = g
        .nodes()
        .iter()
        .zip(centers.iter())
        .map(|(n, c)| Rectangle::from_center(*c, n.size))
        .collect();
    let boxes = cluster_boxes(g, &nodes)?;

    let obstacles: Vec<Obstacle> = g
        .nodes()
        .iter()
        .zip(nodes.iter())
        .map(|(n, r)| Obstacle::new(*r, n.shape == NodeShape::Ellipse))
        .collect();
    let clusters: Vec<ClusterBox> = g
        .clusters()
        .iter()
        .zip(boxes.iter())
        .map(|(c, r)| ClusterBox {
            bbox: *r,
            nodes: c.nodes.clone(),
            clusters: c.clusters.clone(),
        })
        .collect();
    let router = EdgeRouter::new(config, &obstacles, &clusters)?;
    let pairs: Vec<(usize, usize)> = g.edges().iter().map(|e| (e.source, e.target)).collect();
    let curves = router.route_edges(&pairs);

    // The labels that the placement did not reserve room for sit in the
    // middle of their edge. Reserved labels that the routed curve does not
    // pass move to the nearest point of the curve.
    for (i, e) in g.edges().iter().enumerate() {
        let Some(size) = e.label else {
            continue;
        };
        if let Some(reserved) = labels[i] {
            if let Some(curve) = &curves[i] {
                labels[i] = Some(attach_label(reserved, curve));
            }
            continue;
        }
        let mid = match &curves[i] {
            Some(curve) => curve.value_at(0.5),
            None => None,
        };
        let mid = mid.unwrap_or_else(|| centers[e.source].midpoint(centers[e.target]));
        labels[i] = Some(Rectangle::from_center(mid, size));
    }

    let mut res = LayoutResult {
        nodes,
        edges: curves,
        labels,
        clusters: boxes,
        bbox: Rectangle::empty(),
    };
    res.update_bbox();
    #[cfg(feature = "log")]
    log::info!("Finished the layout, bounding box {}", res.bbox);
    Ok(res)
}

#[cfg(test)]
use crate::core::config::EdgeRoutingMode;

#[test]
fn test_cluster_boxes() {
    let mut g = GeometryGraph::new();
    let a = g.add_node(10., 10., NodeShape::Box);
    let b = g.add_node(10., 10., NodeShape::Box);
    let inner = g.add_cluster(vec![a], vec![], 2.);
    let outer = g.add_cluster(vec![b], vec![inner], 3.);
    let empty = g.add_cluster(vec![], vec![], 3.);
    let nodes = vec![
        Rectangle::new(Point::new(0., 0.), Point::new(10., 10.)),
        Rectangle::new(Point::new(20., 0.), Point::new(30., 10.)),
    ];
    let boxes = cluster_boxes(&g, &nodes).unwrap();
    assert_eq!(boxes[inner], Rectangle::new(Point::new(-2., -2.), Point::new(12., 12.)));
    assert_eq!(boxes[outer], Rectangle::new(Point::new(-5., -5.), Point::new(33., 13.)));
    assert!(boxes[empty].is_empty());

    // A cluster that contains itself is rejected.
    let mut g = GeometryGraph::new();
    g.add_node(10., 10., NodeShape::Box);
    g.add_cluster(vec![0], vec![1], 2.);
    g.add_cluster(vec![], vec![0], 2.);
    let res = cluster_boxes(&g, &nodes[..1]);
    assert!(matches!(res, Err(LayoutError::CyclicHierarchy { .. })));
}

#[test]
fn test_layout_driver() {
    let mut g = GeometryGraph::new();
    for _ in 0..4 {
        g.add_node(30., 20., NodeShape::Box);
    }
    g.add_edge(0, 1);
    g.add_labeled_edge(1, 2, Some(Point::new(16., 8.)));
    g.add_edge(2, 0);
    g.add_edge(3, 3);
    let mut config = LayoutConfig {
        edge_routing: EdgeRoutingMode::StraightLine,
        ..Default::default()
    };
    for algorithm in [Algorithm::Layered, Algorithm::Mds] {
        config.algorithm = algorithm;
        let res = layout(&g, &config).unwrap();
        assert_eq!(res.nodes.len(), 4);
        assert_eq!(res.edges.len(), 4);
        assert!(res.edges.iter().all(|e| e.is_some()));
        assert!(res.labels[1].is_some() && res.labels[0].is_none());
        for n in res.nodes.iter() {
            assert!((n.width() - 30.).abs() < 1e-9);
            assert!(res.bbox.contains(n.center()));
        }
        for i in 0..4 {
            for j in i + 1..4 {
                assert!(!res.nodes[i].intersects(&res.nodes[j]));
            }
        }
    }

    // An empty graph has an empty drawing.
    let res = layout(&GeometryGraph::new(), &LayoutConfig::default()).unwrap();
    assert!(res.nodes.is_empty());
}

#[test]
fn test_attach_label() {
    let curve = Curve::from_polyline(&[Point::new(0., 0.), Point::new(0., 100.)]);
    let size = Point::new(20., 10.);

    // A label that touches the curve stays where it was reserved.
    let near = Rectangle::from_center(Point::new(8., 50.), size);
    assert_eq!(attach_label(near, &curve), near);

    // A label away from the curve moves onto it, and keeps its size.
    let far = Rectangle::from_center(Point::new(60., 30.), size);
    let moved = attach_label(far, &curve);
    assert!(moved.center().is_close_to(Point::new(0., 30.), 1e-9));
    assert_eq!(moved.size(), size);
}
