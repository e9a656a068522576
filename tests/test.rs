use glayout::core::geometry::Point;

#[cfg(test)]
mod tests {

    use glayout::adt::graph::{minimum_spanning_tree, topological_order, BasicGraphOnEdges};
    use glayout::adt::int_pair::IntPairSet;
    use glayout::adt::priority_queue::BinaryHeapPriorityQueue;
    use glayout::core::geometry::{weighted_median, Interval, Point, Rectangle};
    use glayout::core::utils::PseudoRandom;
    use glayout::routing::extreme::{BimodalSequence, UnimodalSequence};
    use glayout::routing::polygon::Polygon;
    use glayout::routing::shape::ShapeArena;
    use glayout::solver::Solver;

    #[test]
    fn test_median() {
        let k = weighted_median(&[1.]);
        assert_eq!(k, 1.);
        let k = weighted_median(&[2., 1.]);
        assert_eq!(k, 1.5);
        let k = weighted_median(&[99., 2., 1.]);
        assert_eq!(k, 2.);
        let k = weighted_median(&[90., 23., 0., 1., 3.]);
        assert_eq!(k, 3.);
        let k = weighted_median(&[0., 99., 30., 40.]);
        assert_eq!(k, 35.);
    }

    #[test]
    fn test_median_range() {
        for i in 2..10 {
            let data: Vec<f64> = (1..i).map(|x: usize| x as f64).collect();
            let m = weighted_median(&data);
            assert!(m >= data[0] && m <= data[data.len() - 1]);
        }
    }

    #[test]
    fn test_intervals() {
        let merged = Interval::merge(&Interval::new(0., 1.), &Interval::new(1., 2.));
        assert_eq!(merged.start, 0.);
        assert_eq!(merged.end, 2.);
        let i = Interval::new(1., 2.);
        assert_eq!(i.clamped_to(2.1), 2.);
        assert_eq!(i.clamped_to(0.), 1.);
        assert!(i.contains(1.) && i.contains(2.) && !i.contains(2.01));
    }

    #[test]
    fn test_solver_examples() {
        // Satisfied constraints don't move anything.
        let mut s = Solver::new();
        let a = s.add_variable(0., 1.).unwrap();
        let b = s.add_variable(1., 1.).unwrap();
        s.add_constraint(a, b, 1., false).unwrap();
        s.solve().unwrap();
        assert!((s.position(a) - 0.).abs() < 1e-9);
        assert!((s.position(b) - 1.).abs() < 1e-9);

        // A violated constraint is satisfied exactly.
        let mut s = Solver::new();
        let a = s.add_variable(0., 1.).unwrap();
        let b = s.add_variable(1., 1.).unwrap();
        s.add_constraint(a, b, 2., false).unwrap();
        s.solve().unwrap();
        assert!((s.position(b) - s.position(a) - 2.).abs() < 1e-9);
        assert!(s.position(a) < s.position(b));

        // A cycle of unit gaps can't be satisfied: exactly one link of the
        // cycle ends up out of order.
        let mut s = Solver::new();
        let vars: Vec<_> = (0..5).map(|i| s.add_variable(i as f64, 1.).unwrap()).collect();
        for i in 0..5 {
            s.add_constraint(vars[i], vars[(i + 1) % 5], 1., false).unwrap();
        }
        s.solve().unwrap();
        let pos = s.positions();
        let broken = (0..5).filter(|i| pos[*i] >= pos[(i + 1) % 5]).count();
        assert_eq!(broken, 1);
    }

    #[test]
    fn test_mst_and_topological_order() {
        // A 4-cycle with a heavy diagonal.
        let g4 = BasicGraphOnEdges::from_edges(4, vec![(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
        let tree = minimum_spanning_tree(&g4, |e| if e == 4 { 2. } else { 1. }, 0);
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&4));
        let mut spanned = vec![false; 4];
        for e in tree.iter() {
            let (a, b) = g4.edges()[*e];
            spanned[a] = true;
            spanned[b] = true;
        }
        assert!(spanned.iter().all(|x| *x));

        let cyclic = BasicGraphOnEdges::from_edges(5, vec![(0, 1), (1, 2), (1, 3), (3, 4), (4, 1)]);
        assert!(topological_order(&cyclic).is_none());

        for edges in [vec![(0, 1), (1, 2), (0, 2)], vec![(2, 1), (1, 0), (2, 0)]] {
            let g = BasicGraphOnEdges::from_edges(3, edges.clone());
            let order = topological_order(&g).unwrap();
            let rank = |n: usize| order.iter().position(|x| *x == n).unwrap();
            for (a, b) in edges {
                assert!(rank(a) < rank(b));
            }
        }
    }

    #[test]
    fn test_priority_queue_and_pairs() {
        let mut items: Vec<usize> = (0..30).collect();
        let mut rng = PseudoRandom::new(17);
        for i in (1..items.len()).rev() {
            items.swap(i, rng.below(i + 1));
        }
        let mut q = BinaryHeapPriorityQueue::new(30);
        for i in items.iter() {
            q.enqueue(*i, *i as f64);
        }
        assert_eq!(q.len(), 30);
        q.decrease_priority(29, -1.);
        assert_eq!(q.dequeue(), Some(29));
        let mut prev = None;
        while let Some(i) = q.dequeue() {
            if let Some(p) = prev {
                assert!(p < i);
            }
            prev = Some(i);
        }

        let mut set = IntPairSet::new();
        set.add(1, 2);
        set.add(2, 1);
        set.add(3, 4);
        set.add(5, 1);
        assert_eq!(set.len(), 3);
        assert!(set.contains(1, 5));
    }

    #[test]
    fn test_shape_chain() {
        let mut arena = ShapeArena::new();
        let square = |x: f64| Polygon::from_rectangle(&Rectangle::new(Point::new(x, 0.), Point::new(x + 1., 1.)));
        let a = arena.add_shape(square(0.));
        let b = arena.add_shape(square(2.));
        let c = arena.add_shape(square(4.));
        arena.add_parent(a, b).unwrap();
        arena.add_parent(b, c).unwrap();
        assert_eq!(arena.ancestors(a).count(), 2);
        assert_eq!(arena.children(c).len(), 1);
        assert_eq!(arena.children(a).len(), 0);
        // Closing the loop is rejected.
        assert!(arena.add_parent(c, a).is_err());
    }

    #[test]
    fn test_extreme_search() {
        let data = [1., 3., 7., 12., 9., 4., 2.];
        let seq = UnimodalSequence::new(|i| data[i], data.len());
        assert_eq!(seq.find_maximum(), Some(3));
        let min = seq.find_minimum().unwrap();
        assert_eq!(data[min], 1.);

        let data = [5., 7., 9., 6., 2., 1., 3.];
        let seq = BimodalSequence::new(|i| data[i], data.len());
        assert_eq!(seq.find_maximum(), Some(2));
        assert_eq!(seq.find_minimum(), Some(5));
    }
}

use glayout::core::base::Orientation;
use glayout::core::config::{Algorithm, EdgeRoutingMode, LayoutConfig};
use glayout::core::geometry::Rectangle;
use glayout::topo::synthetic;
use glayout::topo::{layout, GeometryGraph, LayoutResult, NodeShape};

fn assert_no_overlaps(res: &LayoutResult) {
    for i in 0..res.nodes.len() {
        for j in i + 1..res.nodes.len() {
            let (a, b) = (&res.nodes[i], &res.nodes[j]);
            let inner = a.pad(-1e-6);
            assert!(!inner.intersects(b), "Nodes {} and {} overlap", i, j);
        }
    }
}

#[test]
fn test_layered_directions() {
    let g = synthetic::tree(12);
    for direction in [
        Orientation::TopToBottom,
        Orientation::LeftToRight,
        Orientation::BottomToTop,
        Orientation::RightToLeft,
    ] {
        let config = LayoutConfig {
            direction,
            edge_routing: EdgeRoutingMode::None,
            ..Default::default()
        };
        let res = layout(&g, &config).unwrap();
        assert_no_overlaps(&res);
        // Every edge points in the direction of the layers.
        for e in g.edges() {
            let (s, t) = (res.center(e.source), res.center(e.target));
            let ok = match direction {
                Orientation::TopToBottom => s.y < t.y,
                Orientation::BottomToTop => s.y > t.y,
                Orientation::LeftToRight => s.x < t.x,
                Orientation::RightToLeft => s.x > t.x,
            };
            assert!(ok, "Edge {} -> {} goes against the layers", e.source, e.target);
        }
        assert!(res.edges.iter().all(|e| e.is_none()));
    }
}

#[test]
fn test_routing_modes() {
    let g = synthetic::cycle(6);
    for edge_routing in [
        EdgeRoutingMode::StraightLine,
        EdgeRoutingMode::Spline,
        EdgeRoutingMode::SplineBundling,
        EdgeRoutingMode::Rectilinear,
    ] {
        for algorithm in [Algorithm::Layered, Algorithm::Mds] {
            let config = LayoutConfig {
                algorithm,
                edge_routing,
                ..Default::default()
            };
            let res = layout(&g, &config).unwrap();
            assert_no_overlaps(&res);
            for (i, e) in g.edges().iter().enumerate() {
                let Some(curve) = &res.edges[i] else {
                    panic!("Edge {} was not routed", i);
                };
                // The curve connects the two nodes.
                let start = curve.start().unwrap();
                let end = curve.end().unwrap();
                let near = |r: &Rectangle, p: Point| r.pad(config.padding + 1.).contains(p);
                assert!(near(&res.nodes[e.source], start));
                assert!(near(&res.nodes[e.target], end));
                // The drawing contains the curve.
                let bbox = curve.bounding_box();
                assert!(res.bbox.pad(1e-6).contains(bbox.min));
                assert!(res.bbox.pad(1e-6).contains(bbox.max));
            }
        }
    }
}

#[test]
fn test_labels_follow_curves() {
    use glayout::core::curve::point_segment_distance;
    use glayout::core::utils::PseudoRandom;

    let mut rng = PseudoRandom::new(11);
    for round in 0..12 {
        let mut g = GeometryGraph::new();
        let n = 6 + round;
        for _ in 0..n {
            g.add_node(40., 20., NodeShape::Box);
        }
        for i in 1..n {
            let label = Some(Point::new(20., 10.));
            g.add_labeled_edge(rng.below(i), i, label);
            if rng.below(3) == 0 {
                g.add_labeled_edge(rng.below(i), i, label);
            }
        }
        for edge_routing in [
            EdgeRoutingMode::StraightLine,
            EdgeRoutingMode::Spline,
            EdgeRoutingMode::Rectilinear,
        ] {
            for algorithm in [Algorithm::Layered, Algorithm::Mds] {
                let config = LayoutConfig {
                    algorithm,
                    edge_routing,
                    ..Default::default()
                };
                let res = layout(&g, &config).unwrap();
                for i in 0..g.num_edges() {
                    let (Some(curve), Some(label)) = (&res.edges[i], &res.labels[i]) else {
                        continue;
                    };
                    let points = curve.flatten(16);
                    let c = label.center();
                    let dist = points
                        .windows(2)
                        .map(|w| point_segment_distance(c, w[0], w[1]))
                        .fold(f64::INFINITY, f64::min);
                    let reach = label.width().max(label.height());
                    assert!(dist <= reach, "Label {} is {} away from its edge", i, dist);
                }
            }
        }
    }
}

#[test]
fn test_spline_goes_around_nodes() {
    // A chain with an edge that skips over the middle node.
    let mut g = GeometryGraph::new();
    for _ in 0..3 {
        g.add_node(60., 30., NodeShape::Box);
    }
    g.add_edge(0, 1);
    g.add_edge(1, 2);
    let skip = g.add_edge(0, 2);
    let config = LayoutConfig::default();
    let res = layout(&g, &config).unwrap();
    let Some(curve) = &res.edges[skip] else {
        panic!("The edge was not routed");
    };
    for p in curve.flatten(16) {
        assert!(!res.nodes[1].contains_strict(p, 1.), "The edge crosses the middle node at {}", p);
    }
}

#[test]
fn test_clusters_contain_members() {
    let g = synthetic::clustered(14);
    for algorithm in [Algorithm::Layered, Algorithm::Mds] {
        let config = LayoutConfig {
            algorithm,
            ..Default::default()
        };
        let res = layout(&g, &config).unwrap();
        assert_eq!(res.clusters.len(), g.clusters().len());
        for (c, cluster) in g.clusters().iter().enumerate() {
            let bbox = res.clusters[c];
            for n in cluster.nodes.iter() {
                let node = res.nodes[*n];
                assert!(bbox.contains(node.min) && bbox.contains(node.max));
            }
            for sub in cluster.clusters.iter() {
                let inner = res.clusters[*sub];
                assert!(bbox.contains(inner.min) && bbox.contains(inner.max));
            }
        }
    }
}

#[test]
fn test_layout_is_deterministic() {
    let g = synthetic::grid(16);
    for algorithm in [Algorithm::Layered, Algorithm::Mds] {
        let config = LayoutConfig {
            algorithm,
            ..Default::default()
        };
        let a = layout(&g, &config).unwrap().to_string();
        let b = layout(&g, &config).unwrap().to_string();
        assert_eq!(a, b);
    }
}

#[test]
fn test_options() {
    let config = LayoutConfig::from_options(&[
        ("algorithm", "mds"),
        ("rotation", "90"),
        ("edge-routing", "straight-line"),
        ("unknown", "1"),
    ])
    .unwrap();
    assert_eq!(config.algorithm, Algorithm::Mds);
    assert_eq!(config.edge_routing, EdgeRoutingMode::StraightLine);

    // The rotation turns a horizontal chain into a vertical one.
    let g = synthetic::chain(2);
    let res = layout(&g, &config).unwrap();
    let d = res.center(1).sub(res.center(0));
    assert!(d.x.abs() < 1e-3);
    assert!((d.y.abs() - config.ideal_edge_length).abs() < 1e-3);

    assert!(LayoutConfig::from_options(&[("padding", "wide")]).is_err());
}

#[test]
fn test_rotate() {
    fn almost(a: f64, b: f64) {
        let abs_difference = (b - a).abs();
        assert!(abs_difference < 1e-10);
    }
    // 180'
    let p = Point::new(1.0, 0.0);
    let r = p.rotate(180_f64.to_radians());
    almost(r.x, -1.);
    almost(r.y, 0.);

    //90'
    let p = Point::new(1.0, 0.0);
    let r = p.rotate(90_f64.to_radians());
    almost(r.x, 0.);
    almost(r.y, 1.);

    //Rotate around a point.
    let p = Point::new(101.0, 100.0);
    let c = Point::new(100., 100.);
    let r = p.rotate_around(c, 45_f64.to_radians());
    almost(r.x, 100. + 1. / 2_f64.sqrt());
    almost(r.y, 100. + 1. / 2_f64.sqrt());
}
