//! The layout orchestration: the abstract input graph, the layered pipeline
//! (ranking, crossing reduction and placement), the MDS pipeline and the
//! driver that ties placement and edge routing together.

pub mod engine;
pub mod graph;
pub mod layout;
pub mod mds;
pub mod optimizer;
pub mod placer;
pub mod synthetic;

pub use engine::layout;
pub use graph::{GeometryGraph, LayoutResult, NodeShape};
