//! A solver for one dimensional separation constraints, and the overlap
//! removal that is built on top of it.

pub mod block;
pub mod overlap;
pub mod projection;

pub use block::{ConstraintId, VariableId};
pub use projection::Solver;
