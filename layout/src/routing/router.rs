//! The edge router. It turns the placed nodes and clusters into a hierarchy
//! of obstacles and draws each edge in the configured routing mode.

use super::polygon::Polygon;
use super::rectilinear::RectilinearGrid;
use super::relax::{smooth_polyline, RelaxedPolyline};
use super::shape::{ShapeArena, ShapeId};
use super::visibility::{segment_enters, VertexKind, VisibilityGraph, EPS};
use crate::adt::int_pair::IntPairSet;
use crate::core::config::{EdgeRoutingMode, LayoutConfig};
use crate::core::curve::{Curve, Segment};
use crate::core::error::Result;
use crate::core::geometry::{clip_to_box, clip_to_ellipse, Point, Rectangle};
use std::collections::HashSet;

/// A placed node, as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub bbox: Rectangle,
    /// The node is drawn as the ellipse inscribed in its box.
    pub ellipse: bool,
}

impl Obstacle {
    pub fn new(bbox: Rectangle, ellipse: bool) -> Self {
        Self { bbox, ellipse }
    }

    pub fn center(&self) -> Point {
        self.bbox.center()
    }

    /// \returns the point where the ray from the center toward \p toward
    /// leaves the node.
    pub fn boundary_point(&self, toward: Point) -> Point {
        if self.ellipse {
            clip_to_ellipse(self.center(), self.bbox.size(), toward)
        } else {
            clip_to_box(self.center(), self.bbox.size(), toward)
        }
    }

    pub fn polygon(&self) -> Polygon {
        if self.ellipse {
            Polygon::from_ellipse(&self.bbox)
        } else {
            Polygon::from_rectangle(&self.bbox)
        }
    }
}

/// A placed cluster: its box, the nodes that it contains directly and its
/// direct sub-clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBox {
    pub bbox: Rectangle,
    pub nodes: Vec<usize>,
    pub clusters: Vec<usize>,
}

pub struct EdgeRouter {
    config: LayoutConfig,
    nodes: Vec<Obstacle>,
    arena: ShapeArena,
    node_shapes: Vec<ShapeId>,
    /// Empty clusters have no shape.
    cluster_shapes: Vec<Option<ShapeId>>,
    /// The nodes with half of the padding, that relaxed paths must avoid.
    clearance: Vec<Polygon>,
}

impl EdgeRouter {
    pub fn new(config: &LayoutConfig, nodes: &[Obstacle], clusters: &[ClusterBox]) -> Result<Self> {
        let padding = config.padding.max(0.);
        let mut arena = ShapeArena::new();
        let node_shapes: Vec<ShapeId> = nodes
            .iter()
            .map(|n| arena.add_shape(n.polygon().pad(padding)))
            .collect();
        let cluster_shapes: Vec<Option<ShapeId>> = clusters
            .iter()
            .map(|c| {
                if c.nodes.is_empty() && c.clusters.is_empty() {
                    return None;
                }
                let boundary = Polygon::from_rectangle(&c.bbox.pad(padding));
                Some(arena.add_shape(boundary))
            })
            .collect();

        for (c, cluster) in clusters.iter().enumerate() {
            let Some(parent) = cluster_shapes[c] else {
                continue;
            };
            for n in cluster.nodes.iter() {
                arena.add_parent(node_shapes[*n], parent)?;
            }
            for sub in cluster.clusters.iter() {
                if let Some(child) = cluster_shapes[*sub] {
                    arena.add_parent(child, parent)?;
                }
            }
        }

        let clearance = nodes.iter().map(|n| n.polygon().pad(padding / 2.)).collect();
        Ok(Self {
            config: config.clone(),
            nodes: nodes.to_vec(),
            arena,
            node_shapes,
            cluster_shapes,
            clearance,
        })
    }

    pub fn arena(&self) -> &ShapeArena {
        &self.arena
    }

    /// Route the edges \p edges, given as pairs of node indices.
    /// \returns a curve for each edge, or None if routing is disabled.
    pub fn route_edges(&self, edges: &[(usize, usize)]) -> Vec<Option<Curve>> {
        #[cfg(feature = "log")]
        log::info!(
            "Routing {} edges ({:?})",
            edges.len(),
            self.config.edge_routing
        );
        for (s, t) in edges.iter() {
            assert!(*s < self.nodes.len() && *t < self.nodes.len(), "Invalid edge");
        }

        match self.config.edge_routing {
            EdgeRoutingMode::None => vec![None; edges.len()],
            EdgeRoutingMode::StraightLine => edges
                .iter()
                .map(|(s, t)| {
                    if s == t {
                        Some(self.self_loop(*s))
                    } else {
                        Some(self.straight_line(*s, *t))
                    }
                })
                .collect(),
            EdgeRoutingMode::Spline => self.route_splines(edges, false),
            EdgeRoutingMode::SplineBundling => self.route_splines(edges, true),
            EdgeRoutingMode::Rectilinear => self.route_rectilinear(edges),
        }
    }

    /// A line between the node boundaries.
    fn straight_line(&self, s: usize, t: usize) -> Curve {
        let a = self.nodes[s].boundary_point(self.nodes[t].center());
        let b = self.nodes[t].boundary_point(self.nodes[s].center());
        Curve::from_polyline(&[a, b])
    }

    /// A loop on the right side of the node.
    fn self_loop(&self, n: usize) -> Curve {
        let node = &self.nodes[n];
        let center = node.center();
        let size = node.bbox.size();
        let a = node.boundary_point(center.add(Point::new(size.x, -size.y / 2.)));
        let b = node.boundary_point(center.add(Point::new(size.x, size.y / 2.)));
        let reach = size.x.max(size.y) / 2. + self.config.padding;
        let c1 = a.add(Point::new(reach, -reach / 2.));
        let c2 = b.add(Point::new(reach, reach / 2.));
        let mut curve = Curve::new();
        curve.add_segment(Segment::bezier(a, c1, c2, b));
        curve
    }

    fn route_splines(&self, edges: &[(usize, usize)], bundling: bool) -> Vec<Option<Curve>> {
        let mut graph = VisibilityGraph::new(&self.arena);
        // The visibility edges that earlier routes use.
        let mut used = IntPairSet::new();
        let discount = 1. - self.config.bundling_strength.clamp(0., 0.95);

        let mut res = Vec::with_capacity(edges.len());
        for (s, t) in edges.iter().copied() {
            if s == t {
                res.push(Some(self.self_loop(s)));
                continue;
            }
            let ss = self.node_shapes[s];
            let ts = self.node_shapes[t];
            let ps = graph.add_port(&self.arena, self.nodes[s].center(), Some(ss));
            let pt = graph.add_port(&self.arena, self.nodes[t].center(), Some(ts));
            let passable = self.arena.passable_between(ss, ts);
            let path = graph.shortest_path(ps, pt, &passable, |e| {
                let edge = graph.edge(e);
                if used.contains(edge.source, edge.target) {
                    edge.length * discount
                } else {
                    edge.length
                }
            });

            let points = path.map(|path| {
                if bundling {
                    for w in path.windows(2) {
                        let fixed = |v: usize| matches!(graph.kind(v), VertexKind::Boundary { .. });
                        if fixed(w[0]) && fixed(w[1]) {
                            used.add(w[0], w[1]);
                        }
                    }
                }
                path.iter().map(|v| graph.point(*v)).collect::<Vec<_>>()
            });
            graph.remove_ports();

            match points {
                Some(points) => res.push(Some(self.smooth_path(s, t, &points, &passable))),
                None => {
                    #[cfg(feature = "log")]
                    log::warn!("No route from {} to {}, using a straight line", s, t);
                    res.push(Some(self.straight_line(s, t)));
                }
            }
        }
        res
    }

    /// Relax the path \p points of the edge (s, t), clip it to the node
    /// boundaries and round the corners.
    fn smooth_path(&self, s: usize, t: usize, points: &[Point], passable: &HashSet<ShapeId>) -> Curve {
        let is_clear = |a: Point, b: Point| {
            let nodes_clear = self
                .clearance
                .iter()
                .enumerate()
                .all(|(i, poly)| i == s || i == t || !segment_enters(poly, a, b));
            nodes_clear
                && self
                    .cluster_shapes
                    .iter()
                    .flatten()
                    .all(|c| passable.contains(c) || !segment_enters(self.arena.boundary(*c), a, b))
        };
        let mut poly = RelaxedPolyline::new(points);
        poly.relax(self.config.relaxation_passes, is_clear);
        poly.remove_collinear(EPS);

        let mut pts = poly.points();
        let n = pts.len();
        if n < 2 {
            return self.straight_line(s, t);
        }
        pts[0] = self.nodes[s].boundary_point(pts[1]);
        pts[n - 1] = self.nodes[t].boundary_point(pts[n - 2]);
        smooth_polyline(&pts, 2. * self.config.padding)
    }

    fn route_rectilinear(&self, edges: &[(usize, usize)]) -> Vec<Option<Curve>> {
        let padding = self.config.padding.max(0.);
        let boxes: Vec<Rectangle> = self.nodes.iter().map(|n| n.bbox.pad(padding)).collect();
        let ports: Vec<Point> = self.nodes.iter().map(|n| n.center()).collect();
        let grid = RectilinearGrid::new(&boxes, &ports);
        let bend_penalty = self.config.node_separation.max(1.);

        edges
            .iter()
            .map(|(s, t)| {
                let (s, t) = (*s, *t);
                if s == t {
                    return Some(self.self_loop(s));
                }
                let Some(mut pts) = grid.route((ports[s], s), (ports[t], t), bend_penalty) else {
                    #[cfg(feature = "log")]
                    log::warn!("No rectilinear route from {} to {}", s, t);
                    return Some(self.straight_line(s, t));
                };
                let n = pts.len();
                pts[0] = self.nodes[s].boundary_point(pts[1]);
                pts[n - 1] = self.nodes[t].boundary_point(pts[n - 2]);
                Some(Curve::from_polyline(&pts))
            })
            .collect()
    }
}

#[cfg(test)]
fn test_nodes() -> Vec<Obstacle> {
    let node = |x: f64, y: f64| {
        Obstacle::new(
            Rectangle::from_center(Point::new(x, y), Point::new(20., 10.)),
            false,
        )
    };
    vec![node(0., 0.), node(100., 0.), node(50., 0.), node(50., 100.)]
}

#[test]
fn test_route_modes() {
    let nodes = test_nodes();
    let edges = vec![(0, 1), (2, 3), (3, 3)];
    for mode in [
        EdgeRoutingMode::StraightLine,
        EdgeRoutingMode::Spline,
        EdgeRoutingMode::SplineBundling,
        EdgeRoutingMode::Rectilinear,
    ] {
        let config = LayoutConfig {
            edge_routing: mode,
            ..Default::default()
        };
        let router = EdgeRouter::new(&config, &nodes, &[]).unwrap();
        let curves = router.route_edges(&edges);
        assert_eq!(curves.len(), 3);
        for (curve, (s, t)) in curves.iter().zip(edges.iter()) {
            let curve = curve.as_ref().unwrap();
            let start = curve.start().unwrap();
            let end = curve.end().unwrap();
            // The curves start and end on the node boundaries.
            assert!(nodes[*s].bbox.pad(1e-6).contains(start), "{:?}", mode);
            assert!(!nodes[*s].bbox.contains_strict(start, 1e-6), "{:?}", mode);
            assert!(nodes[*t].bbox.pad(1e-6).contains(end), "{:?}", mode);
        }
    }

    let config = LayoutConfig {
        edge_routing: EdgeRoutingMode::None,
        ..Default::default()
    };
    let router = EdgeRouter::new(&config, &nodes, &[]).unwrap();
    assert!(router.route_edges(&edges).iter().all(|c| c.is_none()));
}

#[test]
fn test_spline_avoids_nodes() {
    // The edge from 0 to 1 has to go around node 2.
    let nodes = test_nodes();
    let config = LayoutConfig::default();
    let router = EdgeRouter::new(&config, &nodes, &[]).unwrap();
    let curves = router.route_edges(&[(0, 1)]);
    let curve = curves[0].as_ref().unwrap();
    for p in curve.flatten(16) {
        assert!(!nodes[2].bbox.contains_strict(p, 1e-6), "{}", p);
    }
}

#[test]
fn test_cluster_hierarchy() {
    let nodes = test_nodes();
    let clusters = vec![
        ClusterBox {
            bbox: Rectangle::new(Point::new(-20., -20.), Point::new(120., 20.)),
            nodes: vec![0, 1, 2],
            clusters: vec![],
        },
        ClusterBox {
            bbox: Rectangle::new(Point::new(-30., -30.), Point::new(130., 120.)),
            nodes: vec![3],
            clusters: vec![0],
        },
        ClusterBox {
            bbox: Rectangle::new(Point::new(0., 0.), Point::new(1., 1.)),
            nodes: vec![],
            clusters: vec![],
        },
    ];
    let config = LayoutConfig::default();
    let router = EdgeRouter::new(&config, &nodes, &clusters).unwrap();
    router.arena().verify();
    // Four nodes and two non-empty clusters.
    assert_eq!(router.arena().len(), 6);
    let curves = router.route_edges(&[(0, 3), (0, 1)]);
    assert!(curves.iter().all(|c| c.is_some()));
}
