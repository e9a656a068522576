//! The tangent visibility graph. The vertices are the vertices of the
//! obstacle polygons, and the edges are the polygon sides plus the segments
//! that are tangent to the polygons at both ends. A path that bends around
//! convex obstacles only ever bends at such tangents, so this sparse graph
//! holds the shortest paths between the obstacles.
//!
//! Leaf shapes (nodes) block segments. Shapes with children (clusters) don't
//! block; instead each edge remembers the clusters that it enters, and a
//! route may use the edge only if it's allowed to cross all of them.

use super::polygon::Polygon;
use super::shape::{ShapeArena, ShapeId};
use super::shortest_path::dijkstra;
use crate::adt::int_pair::IntPairSet;
use crate::core::geometry::Point;
use std::collections::HashSet;

/// Tolerance for the geometric predicates of the router.
pub const EPS: f64 = 1e-6;

/// \returns True if the segment (a, b) goes through the interior of
/// \p poly, or connects its interior to the outside.
pub fn segment_enters(poly: &Polygon, a: Point, b: Point) -> bool {
    poly.blocks_segment(a, b, EPS) || poly.contains_strict(a, EPS) != poly.contains_strict(b, EPS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexKind {
    /// The vertex \p index of the boundary of \p shape.
    Boundary { shape: ShapeId, index: usize },
    /// A transient vertex at the end of a route, inside \p shape.
    Port { shape: Option<ShapeId> },
}

#[derive(Debug, Clone)]
pub struct VisibilityEdge {
    pub source: usize,
    pub target: usize,
    pub length: f64,
    /// The clusters that the edge enters.
    pub crossed: Vec<ShapeId>,
}

impl VisibilityEdge {
    pub fn other(&self, v: usize) -> usize {
        if v == self.source {
            self.target
        } else {
            self.source
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityGraph {
    vertices: Vec<(Point, VertexKind)>,
    edges: Vec<VisibilityEdge>,
    adjacency: Vec<Vec<usize>>,
    known: IntPairSet,
    // The size of the graph without ports.
    fixed_vertices: usize,
    fixed_edges: usize,
}

impl VisibilityGraph {
    /// Build the visibility graph of the shapes in \p arena.
    pub fn new(arena: &ShapeArena) -> Self {
        let mut graph = Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            adjacency: Vec::new(),
            known: IntPairSet::new(),
            fixed_vertices: 0,
            fixed_edges: 0,
        };

        // The index of the first vertex of each shape.
        let mut base = Vec::with_capacity(arena.len());
        for s in arena.iter() {
            base.push(graph.vertices.len());
            for (i, p) in arena.boundary(s).points().iter().enumerate() {
                graph.add_vertex(*p, VertexKind::Boundary { shape: s, index: i });
            }
        }

        for a in arena.iter() {
            let pa = arena.boundary(a);
            let ba = base[a.get_index()];

            // The sides of the polygon.
            for i in 0..pa.len() {
                let j = pa.next_index(i);
                if i == j {
                    continue;
                }
                if let Some(crossed) = segment_status(arena, pa.point(i), pa.point(j), &[a]) {
                    graph.add_edge(ba + i, ba + j, crossed);
                }
            }

            // Tangents from each vertex to the other polygons.
            for i in 0..pa.len() {
                let v = pa.point(i);
                for b in arena.iter() {
                    if a == b {
                        continue;
                    }
                    let pb = arena.boundary(b);
                    let Some((t0, t1)) = pb.tangents_from(v) else {
                        continue;
                    };
                    for t in [t0, t1] {
                        let w = pb.point(t);
                        let bb = base[b.get_index()];
                        if graph.known.contains(ba + i, bb + t) {
                            continue;
                        }
                        // Routes may enter clusters, but not nodes.
                        if !arena.is_cluster(a) && !pa.is_locally_tangent(i, w, EPS) {
                            continue;
                        }
                        if let Some(crossed) = segment_status(arena, v, w, &[a, b]) {
                            graph.add_edge(ba + i, bb + t, crossed);
                        }
                    }
                }
            }
        }

        graph.fixed_vertices = graph.vertices.len();
        graph.fixed_edges = graph.edges.len();
        #[cfg(feature = "log")]
        log::debug!(
            "Visibility graph with {} vertices and {} edges",
            graph.vertices.len(),
            graph.edges.len()
        );
        graph
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn point(&self, v: usize) -> Point {
        self.vertices[v].0
    }

    pub fn kind(&self, v: usize) -> VertexKind {
        self.vertices[v].1
    }

    pub fn edge(&self, e: usize) -> &VisibilityEdge {
        &self.edges[e]
    }

    pub fn edges(&self) -> &[VisibilityEdge] {
        &self.edges
    }

    /// \returns the edges that touch \p v.
    pub fn incident_edges(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.known.contains(a, b)
    }

    fn add_vertex(&mut self, p: Point, kind: VertexKind) -> usize {
        self.vertices.push((p, kind));
        self.adjacency.push(Vec::new());
        self.vertices.len() - 1
    }

    fn add_edge(&mut self, a: usize, b: usize, crossed: Vec<ShapeId>) -> bool {
        if a == b || !self.known.add(a, b) {
            return false;
        }
        let length = self.point(a).distance_to(self.point(b));
        self.edges.push(VisibilityEdge {
            source: a,
            target: b,
            length,
            crossed,
        });
        let idx = self.edges.len() - 1;
        self.adjacency[a].push(idx);
        self.adjacency[b].push(idx);
        true
    }

    /// Add a port at \p p, inside the shape \p shape, and connect it to all
    /// of the vertices that it can see. \returns the new vertex.
    pub fn add_port(&mut self, arena: &ShapeArena, p: Point, shape: Option<ShapeId>) -> usize {
        let port = self.add_vertex(p, VertexKind::Port { shape });
        for u in 0..port {
            let (q, kind) = self.vertices[u];
            let mut ignore: Vec<ShapeId> = shape.into_iter().collect();
            match kind {
                VertexKind::Boundary { shape: owner, index } => {
                    let own = Some(owner) == shape;
                    if !own
                        && !arena.is_cluster(owner)
                        && !arena.boundary(owner).is_locally_tangent(index, p, EPS)
                    {
                        continue;
                    }
                    ignore.push(owner);
                }
                VertexKind::Port { shape: Some(other) } => ignore.push(other),
                VertexKind::Port { shape: None } => {}
            }
            if let Some(crossed) = segment_status(arena, q, p, &ignore) {
                self.add_edge(u, port, crossed);
            }
        }
        port
    }

    /// Remove all of the ports and their edges.
    pub fn remove_ports(&mut self) {
        for e in self.edges.drain(self.fixed_edges..) {
            self.known.remove(e.source, e.target);
        }
        self.vertices.truncate(self.fixed_vertices);
        self.adjacency.truncate(self.fixed_vertices);
        let fixed_edges = self.fixed_edges;
        for adj in self.adjacency.iter_mut() {
            adj.retain(|e| *e < fixed_edges);
        }
    }

    /// Find the cheapest path from \p source to \p target that only crosses
    /// the clusters in \p passable. \p cost returns the cost of an edge.
    /// \returns the vertices along the path.
    pub fn shortest_path<F>(
        &self,
        source: usize,
        target: usize,
        passable: &HashSet<ShapeId>,
        cost: F,
    ) -> Option<Vec<usize>>
    where
        F: Fn(usize) -> f64,
    {
        let neighbors = |v: usize| {
            self.adjacency[v]
                .iter()
                .filter(|e| self.edges[**e].crossed.iter().all(|c| passable.contains(c)))
                .map(|e| (self.edges[*e].other(v), cost(*e)))
                .collect::<Vec<_>>()
        };
        dijkstra(self.vertices.len(), source, target, neighbors)
    }
}

/// Check the segment (a, b) against all of the shapes. \returns None if one
/// of the leaf shapes (other than the ones in \p ignore) blocks the segment,
/// and otherwise the list of the clusters that the segment enters.
fn segment_status(arena: &ShapeArena, a: Point, b: Point, ignore: &[ShapeId]) -> Option<Vec<ShapeId>> {
    let mut crossed = Vec::new();
    for s in arena.iter() {
        let poly = arena.boundary(s);
        if arena.is_cluster(s) {
            if segment_enters(poly, a, b) {
                crossed.push(s);
            }
        } else if !ignore.contains(&s) && segment_enters(poly, a, b) {
            return None;
        }
    }
    Some(crossed)
}

#[cfg(test)]
use crate::core::geometry::Rectangle;

#[cfg(test)]
fn rect_shape(arena: &mut ShapeArena, x0: f64, y0: f64, x1: f64, y1: f64) -> ShapeId {
    let r = Rectangle::new(Point::new(x0, y0), Point::new(x1, y1));
    arena.add_shape(Polygon::from_rectangle(&r))
}

#[cfg(test)]
fn path_points(graph: &VisibilityGraph, path: &[usize]) -> Vec<Point> {
    path.iter().map(|v| graph.point(*v)).collect()
}

#[test]
fn test_route_around_obstacle() {
    let mut arena = ShapeArena::new();
    let s = rect_shape(&mut arena, 0., 0., 10., 10.);
    let t = rect_shape(&mut arena, 100., 0., 110., 10.);
    let wall = rect_shape(&mut arena, 45., -20., 65., 40.);
    let mut graph = VisibilityGraph::new(&arena);
    let fixed = graph.num_vertices();
    assert_eq!(fixed, 12);

    let ps = graph.add_port(&arena, Point::new(5., 5.), Some(s));
    let pt = graph.add_port(&arena, Point::new(105., 5.), Some(t));
    let passable = HashSet::new();
    let path = graph
        .shortest_path(ps, pt, &passable, |e| graph.edge(e).length)
        .unwrap();
    let points = path_points(&graph, &path);
    assert_eq!(points.first(), Some(&Point::new(5., 5.)));
    assert_eq!(points.last(), Some(&Point::new(105., 5.)));
    // The path goes over the wall (the shorter side), through two of its
    // corners.
    assert_eq!(points.len(), 4);
    let wall_poly = arena.boundary(wall);
    for w in points.windows(2) {
        assert!(!segment_enters(wall_poly, w[0], w[1]));
    }
    assert!(points.contains(&Point::new(45., -20.)));
    assert!(points.contains(&Point::new(65., -20.)));

    graph.remove_ports();
    assert_eq!(graph.num_vertices(), fixed);
    assert!(graph.edges().iter().all(|e| e.source < fixed && e.target < fixed));
}

#[test]
fn test_direct_route() {
    let mut arena = ShapeArena::new();
    let s = rect_shape(&mut arena, 0., 0., 10., 10.);
    let t = rect_shape(&mut arena, 100., 0., 110., 10.);
    let mut graph = VisibilityGraph::new(&arena);
    let ps = graph.add_port(&arena, Point::new(5., 5.), Some(s));
    let pt = graph.add_port(&arena, Point::new(105., 5.), Some(t));
    assert!(graph.has_edge(ps, pt));
    let path = graph
        .shortest_path(ps, pt, &HashSet::new(), |e| graph.edge(e).length)
        .unwrap();
    assert_eq!(path, vec![ps, pt]);
}

#[test]
fn test_clusters() {
    // Two nodes in a cluster, and one node outside of it.
    let mut arena = ShapeArena::new();
    let a = rect_shape(&mut arena, 10., 10., 20., 20.);
    let b = rect_shape(&mut arena, 40., 22., 50., 28.);
    let d = rect_shape(&mut arena, 100., 10., 110., 20.);
    let c = rect_shape(&mut arena, 0., 0., 60., 30.);
    arena.add_parent(a, c).unwrap();
    arena.add_parent(b, c).unwrap();
    let cluster = arena.boundary(c).clone();

    let mut graph = VisibilityGraph::new(&arena);
    let pa = graph.add_port(&arena, Point::new(15., 15.), Some(a));
    let pb = graph.add_port(&arena, Point::new(45., 25.), Some(b));
    let pd = graph.add_port(&arena, Point::new(105., 15.), Some(d));

    // Inside the cluster the route can't leave it.
    let passable = arena.passable_between(a, b);
    assert!(passable.is_empty());
    let path = graph
        .shortest_path(pa, pb, &passable, |e| graph.edge(e).length)
        .unwrap();
    for p in path_points(&graph, &path) {
        assert!(cluster.contains(p, EPS));
    }

    // The route to the outside node has to cross the cluster boundary.
    let passable = arena.passable_between(a, d);
    assert_eq!(passable, [c].into_iter().collect());
    let path = graph
        .shortest_path(pa, pd, &passable, |e| graph.edge(e).length)
        .unwrap();
    assert_eq!(path, vec![pa, pd]);
    assert!(graph
        .shortest_path(pa, pd, &HashSet::new(), |e| graph.edge(e).length)
        .is_none());
}
