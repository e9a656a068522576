//! This module contains the placer, the code that assigns X,Y coordinates to
//! all of the elements in the graph.

pub const EPSILON: f64 = 0.001;

/// The number of rounds of the x coordinate refinement.
pub const ALIGN_ROUNDS: usize = 6;

/// Connectors pull harder toward their neighbors, to keep long edges
/// straight.
pub const CONNECTOR_WEIGHT: f64 = 4.;

mod align;
mod simple;
mod verifier;

pub mod place;
pub use place::Placer;
