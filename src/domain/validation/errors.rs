//! Error types for diagram validation.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Tag identifying one structural validation failure.
///
/// Tags allow programmatic inspection of failures, which is more robust
/// than string matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidationCode {
    /// No start nodes and no end nodes were found.
    NoStartOrEndNodes,
    /// No start nodes (nodes with no incoming edges) were found.
    NoStartNodes,
    /// No end nodes (nodes with no outgoing edges) were found.
    NoEndNodes,
    /// The diagram has no edges.
    NoEdges,
    /// The diagram has no issues.
    NoIssues,
    /// A directed cycle was detected.
    NoLoops,
    /// An uncertainty issue has no outcomes.
    UncertaintyOutcomes,
    /// A decision issue has no options.
    DecisionOptions,
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationCode::NoStartOrEndNodes => "NoStartOrEndNodes",
            ValidationCode::NoStartNodes => "NoStartNodes",
            ValidationCode::NoEndNodes => "NoEndNodes",
            ValidationCode::NoEdges => "NoEdges",
            ValidationCode::NoIssues => "NoIssues",
            ValidationCode::NoLoops => "NoLoops",
            ValidationCode::UncertaintyOutcomes => "UncertaintyOutcomes",
            ValidationCode::DecisionOptions => "DecisionOptions",
        };
        write!(f, "{}", s)
    }
}

/// A single structural validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Aggregated structural validation failures.
///
/// Never partially applied: every failure found in one validation pass is
/// collected before the error is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct StructuralValidationError {
    pub failures: Vec<ValidationFailure>,
}

impl StructuralValidationError {
    /// True if any failure carries the given tag.
    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.failures.iter().any(|f| f.code == code)
    }
}

impl fmt::Display for StructuralValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid influence diagram: ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "[{}] {}", failure.code, failure.message)?;
        }
        Ok(())
    }
}

/// The diagram repair loop exceeded its reconstruction bound.
///
/// Fatal: indicates a pathological or adversarial graph, never a
/// recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Cyclical reconstruction of the influence diagram detected after {attempts} passes; \
     the repair bound prevents infinite recursion during fragment filtering"
)]
pub struct RecursionLimitError {
    pub attempts: u32,
}

/// Any failure raised by [`super::DiagramValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Structural(#[from] StructuralValidationError),

    #[error(transparent)]
    RepairLimit(#[from] RecursionLimitError),
}
