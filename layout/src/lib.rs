/*!
This crate provides a graph layout engine. It computes the positions of the
nodes of an abstract graph and the curves of its edges. The nodes only have a
size and a shape, the edges may carry a label, and nodes can be grouped into
nested clusters.

The engine is built from a few independent parts, see the documentation of
the sub modules for details:

- `solver`: a projection solver for one dimensional separation constraints,
  that is used for node placement and overlap removal.
- `routing`: tangent visibility graphs around nested convex obstacles,
  shortest paths, path smoothing and rectilinear routing.
- `adt`: priority queues, integer pair sets and graph algorithms.
- `topo`: the layered and the MDS layout pipelines, and the driver.

# Layout example: place a small graph

```rust
    use glayout::core::config::LayoutConfig;
    use glayout::topo::{layout, GeometryGraph, NodeShape};

    let mut g = GeometryGraph::new();
    let a = g.add_node(60., 30., NodeShape::Box);
    let b = g.add_node(60., 30., NodeShape::Ellipse);
    let c = g.add_node(40., 40., NodeShape::Box);
    g.add_edge(a, b);
    g.add_edge(a, c);
    g.add_cluster(vec![b, c], vec![], 10.);

    let config = LayoutConfig::from_options(&[("direction", "left-to-right")]).unwrap();
    let res = layout(&g, &config).unwrap();
    println!("{}", res);
```

# Solver example: separate two variables

```rust
    use glayout::solver::Solver;

    let mut solver = Solver::new();
    let x0 = solver.add_variable(0., 1.).unwrap();
    let x1 = solver.add_variable(1., 1.).unwrap();
    // x1 - x0 >= 2.
    solver.add_constraint(x0, x1, 2., false).unwrap();
    solver.solve().unwrap();
    assert!((solver.position(x1) - solver.position(x0) - 2.).abs() < 1e-9);
```

*/

pub mod adt;
pub mod core;
pub mod routing;
pub mod solver;
pub mod topo;
