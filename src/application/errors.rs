//! Application-level error type.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::tree::{PruningError, TreeBuildError};
use crate::domain::validation::DiagramError;

/// Any failure surfaced by an engine handler.
///
/// Core failures propagate uncaught; translating them into user-facing
/// responses is the host layer's concern.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Diagram(#[from] DiagramError),

    #[error(transparent)]
    Build(#[from] TreeBuildError),

    #[error(transparent)]
    Pruning(#[from] PruningError),

    #[error(transparent)]
    External(#[from] DomainError),

    #[error("engine worker task failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn external_errors_wrap_transparently() {
        let err: EngineError =
            DomainError::new(ErrorCode::SolverError, "solver rejected diagram").into();
        assert_eq!(err.to_string(), "[SOLVER_ERROR] solver rejected diagram");
    }

    #[test]
    fn build_errors_wrap_transparently() {
        let err: EngineError = TreeBuildError::EmptyPartialOrder.into();
        assert!(err.to_string().contains("empty partial order"));
    }
}
