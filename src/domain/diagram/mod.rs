//! Influence diagram entities.
//!
//! An `Issue` is a node of the diagram and owns at most one payload
//! (decision, uncertainty or utility), mutually exclusive by kind.
//! `Edge` is a directed relevance arc between two issues, scoped to a
//! project.

mod decision;
mod edge;
mod issue;
mod uncertainty;
mod utility;

pub use decision::{Decision, DecisionOption};
pub use edge::Edge;
pub use issue::{Issue, IssuePayload};
pub use uncertainty::{DiscreteProbability, Outcome, Uncertainty};
pub use utility::{DiscreteUtility, Utility};
