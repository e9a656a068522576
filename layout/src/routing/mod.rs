//! Edge routing around nested obstacles. The router builds a tangent
//! visibility graph over convex polygons (found with logarithmic tangent
//! searches), finds shortest paths in it, and smooths them into curves.

pub mod extreme;
pub mod polygon;
pub mod rectilinear;
pub mod relax;
pub mod router;
pub mod shape;
pub mod shortest_path;
pub mod visibility;

pub use router::{ClusterBox, EdgeRouter, Obstacle};
