//! Policy solver port.
//!
//! The numeric solver is an external collaborator: given a validated
//! diagram it computes which option is optimal at each decision under
//! each parent-state combination and the resulting expected value. The
//! engine consumes the returned solution as an opaque value object.

use async_trait::async_trait;

use crate::domain::diagram::{Edge, Issue};
use crate::domain::foundation::DomainError;
use crate::domain::solution::Solution;

/// Port for the external optimal-policy solver.
#[async_trait]
pub trait PolicySolver: Send + Sync {
    /// Solves the diagram and returns the optimal policy.
    ///
    /// The `(issues, edges)` pair is validator output: acyclic and
    /// connected.
    ///
    /// # Errors
    ///
    /// - `SolverError` if the diagram cannot be solved
    async fn solve(&self, issues: &[Issue], edges: &[Edge]) -> Result<Solution, DomainError>;
}
