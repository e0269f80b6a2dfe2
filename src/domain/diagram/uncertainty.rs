//! Uncertainty payload - a chance event with outcomes and a discrete
//! conditional probability table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{OptionId, OutcomeId, StateId, TableRowId};

/// A possible outcome of an uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub name: String,
    /// Scalar utility contribution of this outcome occurring.
    pub utility: f64,
}

impl Outcome {
    /// Creates an outcome with zero utility contribution.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OutcomeId::new(),
            name: name.into(),
            utility: 0.0,
        }
    }

    /// Sets the utility contribution.
    pub fn with_utility(mut self, utility: f64) -> Self {
        self.utility = utility;
        self
    }
}

/// One row of a discrete conditional probability table.
///
/// Keyed by an outcome plus the parent-state combination the probability
/// is conditioned on. The row set of an uncertainty must cover the full
/// Cartesian product of its relevant parents' state sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteProbability {
    pub id: TableRowId,
    pub outcome_id: OutcomeId,
    pub probability: f64,
    pub parent_option_ids: Vec<OptionId>,
    pub parent_outcome_ids: Vec<OutcomeId>,
}

impl DiscreteProbability {
    /// Creates an unconditioned row with probability zero.
    pub fn unconditioned(outcome_id: OutcomeId) -> Self {
        Self {
            id: TableRowId::new(),
            outcome_id,
            probability: 0.0,
            parent_option_ids: Vec::new(),
            parent_outcome_ids: Vec::new(),
        }
    }

    /// The combined parent-state set this row is conditioned on.
    pub fn parent_states(&self) -> BTreeSet<StateId> {
        self.parent_option_ids
            .iter()
            .map(|id| StateId::from(*id))
            .chain(self.parent_outcome_ids.iter().map(|id| StateId::from(*id)))
            .collect()
    }
}

/// Uncertainty payload owned by exactly one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    /// Only key uncertainties participate in table generation and
    /// elimination ordering.
    pub is_key: bool,
    pub outcomes: Vec<Outcome>,
    pub probabilities: Vec<DiscreteProbability>,
}

impl Uncertainty {
    /// Creates a key uncertainty with the given outcomes and no table rows.
    pub fn key(outcomes: Vec<Outcome>) -> Self {
        Self {
            is_key: true,
            outcomes,
            probabilities: Vec::new(),
        }
    }

    /// Creates a non-key uncertainty.
    pub fn background(outcomes: Vec<Outcome>) -> Self {
        Self {
            is_key: false,
            outcomes,
            probabilities: Vec::new(),
        }
    }

    /// Identifiers of all outcomes, in order.
    pub fn outcome_ids(&self) -> Vec<OutcomeId> {
        self.outcomes.iter().map(|o| o.id).collect()
    }

    /// Looks up an outcome by identifier.
    pub fn outcome(&self, id: OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }
}
