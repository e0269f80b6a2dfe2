//! Classification enums for diagram issues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of an issue in the influence diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    Unassigned,
    Decision,
    Uncertainty,
    Fact,
    Utility,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::Unassigned => "Unassigned",
            IssueKind::Decision => "Decision",
            IssueKind::Uncertainty => "Uncertainty",
            IssueKind::Fact => "Fact",
            IssueKind::Utility => "Utility",
        };
        write!(f, "{}", s)
    }
}

/// Whether an issue is inside, on the edge of, or outside the analysis scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    In,
    On,
    Out,
}

impl Boundary {
    /// True if the issue participates in table generation (inside or on
    /// the edge of the analysis scope).
    pub fn is_in_scope(&self) -> bool {
        matches!(self, Boundary::In | Boundary::On)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Boundary::In => "in",
            Boundary::On => "on",
            Boundary::Out => "out",
        };
        write!(f, "{}", s)
    }
}

/// Hierarchy tag of a decision.
///
/// Only `Focus` decisions participate in table generation and in the
/// elimination ordering; policy and tactical decisions are context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionHierarchy {
    Policy,
    Focus,
    Tactical,
}

impl fmt::Display for DecisionHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionHierarchy::Policy => "Policy",
            DecisionHierarchy::Focus => "Focus",
            DecisionHierarchy::Tactical => "Tactical",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_scope_membership() {
        assert!(Boundary::In.is_in_scope());
        assert!(Boundary::On.is_in_scope());
        assert!(!Boundary::Out.is_in_scope());
    }

    #[test]
    fn boundary_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Boundary::In).unwrap(), "\"in\"");
        assert_eq!(serde_json::to_string(&Boundary::Out).unwrap(), "\"out\"");
    }

    #[test]
    fn issue_kind_displays_pascal_case() {
        assert_eq!(IssueKind::Uncertainty.to_string(), "Uncertainty");
        assert_eq!(IssueKind::Decision.to_string(), "Decision");
    }
}
