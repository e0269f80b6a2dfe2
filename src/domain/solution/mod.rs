//! Solved-policy value objects.
//!
//! Produced by the external policy solver and consumed, never mutated,
//! by the tree pruner: each focus decision, under a specific tuple of
//! ancestor states, maps to its optimal option and the expected value at
//! that point.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{IssueId, OptionId, StateId};

/// One ancestor state an optimal option is conditioned on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentState {
    /// The issue the state belongs to.
    pub parent_id: IssueId,
    /// The option or outcome committed to on the path.
    pub state_id: StateId,
    pub state_name: String,
}

/// The optimal option for one decision under one ancestor-state tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalOption {
    pub decision_id: IssueId,
    pub option_id: OptionId,
    pub option_name: String,
    /// Ancestor states required for this option to apply.
    pub parent_states: Vec<ParentState>,
    /// Expected value at this decision point.
    pub expected_value: f64,
}

impl OptimalOption {
    /// The required ancestor-state set.
    pub fn required_states(&self) -> BTreeSet<StateId> {
        self.parent_states.iter().map(|p| p.state_id).collect()
    }
}

/// Optimal decisions sharing one solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSolution {
    pub optimal_decisions: Vec<OptimalOption>,
    /// Mean expected utility of the solved policy.
    pub mean: f64,
}

/// The full solved policy for a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub decision_solutions: Vec<DecisionSolution>,
}

impl Solution {
    /// A solution with a single decision-solution group.
    pub fn single(optimal_decisions: Vec<OptimalOption>, mean: f64) -> Self {
        Self {
            decision_solutions: vec![DecisionSolution {
                optimal_decisions,
                mean,
            }],
        }
    }

    /// All optimal decisions across every decision-solution group.
    pub fn all_optimal_decisions(&self) -> impl Iterator<Item = &OptimalOption> {
        self.decision_solutions
            .iter()
            .flat_map(|s| s.optimal_decisions.iter())
    }
}
