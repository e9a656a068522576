//! The error type of the layout engine. Conditions that can only be caused by
//! a bug in the caller (bad handles, dangling edges) are asserted instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("variable weight must be positive and finite, got {0}")]
    InvalidWeight(f64),

    #[error("constraint between variable {0} and itself")]
    SelfConstraint(usize),

    #[error("infeasible equality constraint between variables {left} and {right}")]
    InfeasibleConstraintSet { left: usize, right: usize },

    #[error("making shape {parent} a parent of shape {child} creates a cycle")]
    CyclicHierarchy { child: usize, parent: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[test]
fn test_error_messages() {
    let e = LayoutError::InfeasibleConstraintSet { left: 1, right: 2 };
    assert_eq!(
        e.to_string(),
        "infeasible equality constraint between variables 1 and 2"
    );
    let e: LayoutError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(e, LayoutError::Config(_)));
}
