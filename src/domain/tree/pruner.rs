//! Prunes a materialized tree down to the solved policy's optimal path.
//!
//! A visitor walks the tree with a mutable ancestor-state path: decision
//! nodes keep only the optimal branch, uncertainty nodes drop
//! zero-probability branches, endpoints terminate. The builder guarantees
//! fresh identifiers per branch, so in-place mutation cannot alias.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::domain::foundation::{IssueKind, OutcomeId, StateId};
use crate::domain::solution::{OptimalOption, Solution};

use super::node::{DecisionTree, NodePayload};

/// A policy/tree mismatch discovered during pruning.
///
/// Always fatal: a partially-pruned tree is worse than none.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruningError {
    #[error("no optimal decision found for node {name}")]
    NoOptimalDecision { name: String },

    #[error("optimal option {option_name} is not among the options of decision {name}")]
    OptionNotInDecision { name: String, option_name: String },

    #[error("invalid {kind} node visited during pruning")]
    InvalidNode { kind: &'static str },
}

/// Tree-walking visitor applying a solved policy.
pub struct DecisionTreePruner<'a> {
    solution: &'a Solution,
}

impl<'a> DecisionTreePruner<'a> {
    pub fn new(solution: &'a Solution) -> Self {
        Self { solution }
    }

    /// Prunes the tree in place.
    ///
    /// Afterwards every decision node has exactly one child (the optimal
    /// option) and every surviving uncertainty branch has strictly
    /// positive probability.
    ///
    /// # Errors
    ///
    /// [`PruningError`] when the policy does not cover an encountered
    /// decision under the current ancestor path, or when a node's shape
    /// contradicts its kind.
    pub fn prune(&self, tree: &mut DecisionTree) -> Result<(), PruningError> {
        let mut path = HashSet::new();
        self.visit(tree, &mut path)
    }

    fn visit(
        &self,
        tree: &mut DecisionTree,
        path: &mut HashSet<StateId>,
    ) -> Result<(), PruningError> {
        let kind = match &tree.node.payload {
            NodePayload::Endpoint(_) => return Ok(()),
            NodePayload::Issue(issue) => issue.kind(),
        };
        match kind {
            IssueKind::Decision => self.visit_decision(tree, path),
            IssueKind::Uncertainty => self.visit_uncertainty(tree, path),
            _ => Err(PruningError::InvalidNode { kind: "payload" }),
        }
    }

    /// Keeps only the child and option matching the policy's optimal
    /// option for the current ancestor path.
    fn visit_decision(
        &self,
        tree: &mut DecisionTree,
        path: &mut HashSet<StateId>,
    ) -> Result<(), PruningError> {
        let issue = tree
            .node
            .issue()
            .ok_or(PruningError::InvalidNode { kind: "decision" })?;
        let name = issue.name.clone();
        let decision_id = issue.id;

        let optimal = self
            .solution
            .all_optimal_decisions()
            .find(|candidate| {
                candidate.decision_id == decision_id && parent_states_hold(candidate, path)
            })
            .cloned()
            .ok_or(PruningError::NoOptimalDecision { name: name.clone() })?;

        let mut children = tree
            .children
            .take()
            .filter(|c| !c.is_empty())
            .ok_or(PruningError::InvalidNode { kind: "decision" })?;

        let decision = tree
            .node
            .issue_mut()
            .and_then(|issue| issue.decision_payload_mut())
            .ok_or(PruningError::InvalidNode { kind: "decision" })?;

        let index = decision
            .options
            .iter()
            .position(|option| option.id == optimal.option_id)
            .ok_or_else(|| PruningError::OptionNotInDecision {
                name: name.clone(),
                option_name: optimal.option_name.clone(),
            })?;
        if index >= children.len() {
            return Err(PruningError::InvalidNode { kind: "decision" });
        }

        // Keep only the optimal branch, in children and options alike.
        let mut kept = children.swap_remove(index);
        decision.options.retain(|option| option.id == optimal.option_id);
        debug!(decision = %name, option = %optimal.option_name, "pruned decision to optimal option");

        let state = StateId::from(optimal.option_id);
        path.insert(state);
        let result = self.visit(&mut kept, path);
        path.remove(&state);
        result?;

        tree.children = Some(vec![kept]);
        Ok(())
    }

    /// Aligns probability rows with outcome order, removes
    /// zero-probability (child, row, outcome) triples in lockstep, and
    /// recurses into the survivors.
    fn visit_uncertainty(
        &self,
        tree: &mut DecisionTree,
        path: &mut HashSet<StateId>,
    ) -> Result<(), PruningError> {
        let children = tree
            .children
            .as_mut()
            .filter(|c| !c.is_empty())
            .ok_or(PruningError::InvalidNode { kind: "uncertainty" })?;

        let node = &mut tree.node;
        let probabilities = node
            .probabilities
            .as_mut()
            .filter(|p| !p.is_empty())
            .ok_or(PruningError::InvalidNode { kind: "uncertainty" })?;
        let uncertainty = match &mut node.payload {
            NodePayload::Issue(issue) => issue.uncertainty_payload_mut(),
            NodePayload::Endpoint(_) => None,
        }
        .ok_or(PruningError::InvalidNode { kind: "uncertainty" })?;

        // Align probability rows to the outcome list order.
        let outcome_order: HashMap<OutcomeId, usize> = uncertainty
            .outcomes
            .iter()
            .enumerate()
            .map(|(index, outcome)| (outcome.id, index))
            .collect();
        probabilities.sort_by_key(|view| {
            outcome_order
                .get(&view.outcome_id)
                .copied()
                .unwrap_or(usize::MAX)
        });

        // Remove zero-probability triples in lockstep, back to front.
        let mut index = children
            .len()
            .min(probabilities.len())
            .min(uncertainty.outcomes.len());
        while index > 0 {
            index -= 1;
            if probabilities[index].probability_value == 0.0 {
                children.remove(index);
                probabilities.remove(index);
                uncertainty.outcomes.remove(index);
            }
        }

        let surviving: Vec<OutcomeId> = uncertainty
            .outcomes
            .iter()
            .map(|outcome| outcome.id)
            .collect();
        for (child, outcome_id) in children.iter_mut().zip(surviving) {
            let state = StateId::from(outcome_id);
            path.insert(state);
            let result = self.visit(child, path);
            path.remove(&state);
            result?;
        }
        Ok(())
    }
}

/// True when every ancestor state the option requires is on the path.
fn parent_states_hold(candidate: &OptimalOption, path: &HashSet<StateId>) -> bool {
    candidate
        .parent_states
        .iter()
        .all(|parent| path.contains(&parent.state_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::diagram::{Decision, DecisionOption, Issue, Outcome, Uncertainty};
    use crate::domain::foundation::{OptionId, ProjectId};
    use crate::domain::ordering::PartialOrder;
    use crate::domain::solution::ParentState;
    use crate::domain::tree::DecisionTreeBuilder;

    fn optimal(decision: &Issue, option_index: usize) -> OptimalOption {
        let option = &decision.decision_payload().unwrap().options[option_index];
        OptimalOption {
            decision_id: decision.id,
            option_id: option.id,
            option_name: option.name.clone(),
            parent_states: vec![],
            expected_value: 1.0,
        }
    }

    fn build_tree(issues: &[Issue], order: &[crate::domain::foundation::IssueId]) -> DecisionTree {
        DecisionTreeBuilder::new(issues, &EngineConfig::default())
            .build(&PartialOrder::new(order.to_vec()))
            .unwrap()
    }

    #[test]
    fn decision_prunes_to_single_optimal_child() {
        let project_id = ProjectId::new();
        let d = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![
                DecisionOption::new("x"),
                DecisionOption::new("y"),
                DecisionOption::new("z"),
            ]),
        );
        let solution = Solution::single(vec![optimal(&d, 1)], 1.0);
        let optimal_id = d.decision_payload().unwrap().options[1].id;
        let issues = vec![d.clone()];

        let mut tree = build_tree(&issues, &[d.id]);
        DecisionTreePruner::new(&solution).prune(&mut tree).unwrap();

        let children = tree.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        let options = &tree
            .node
            .issue()
            .unwrap()
            .decision_payload()
            .unwrap()
            .options;
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, optimal_id);

        // The surviving child is the one expanded for option "y".
        let expected_child =
            crate::domain::foundation::TreeNodeId::derive_from_path(&format!(
                "root - {}",
                StateId::from(optimal_id)
            ));
        assert_eq!(children[0].node.id, expected_child);
    }

    #[test]
    fn missing_policy_entry_is_fatal() {
        let project_id = ProjectId::new();
        let d = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![DecisionOption::new("x")]),
        );
        let solution = Solution::single(vec![], 0.0);
        let issues = vec![d.clone()];

        let mut tree = build_tree(&issues, &[d.id]);
        let err = DecisionTreePruner::new(&solution)
            .prune(&mut tree)
            .unwrap_err();
        assert_eq!(
            err,
            PruningError::NoOptimalDecision {
                name: "D".to_string()
            }
        );
    }

    #[test]
    fn policy_entry_with_unsatisfied_parents_is_not_used() {
        let project_id = ProjectId::new();
        let d = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![DecisionOption::new("x")]),
        );
        let mut entry = optimal(&d, 0);
        entry.parent_states = vec![ParentState {
            parent_id: IssueId::new(),
            state_id: StateId::from(OptionId::new()),
            state_name: "elsewhere".to_string(),
        }];
        let solution = Solution::single(vec![entry], 0.0);
        let issues = vec![d.clone()];

        let mut tree = build_tree(&issues, &[d.id]);
        let err = DecisionTreePruner::new(&solution)
            .prune(&mut tree)
            .unwrap_err();
        assert!(matches!(err, PruningError::NoOptimalDecision { .. }));
    }

    use crate::domain::foundation::IssueId;

    fn uncertainty_with_probabilities(
        project_id: ProjectId,
        outcome_probs: &[(&str, f64)],
    ) -> Issue {
        let outcomes: Vec<Outcome> = outcome_probs
            .iter()
            .map(|(name, _)| Outcome::new(*name))
            .collect();
        let mut uncertainty = Uncertainty::key(outcomes);
        uncertainty.probabilities = uncertainty
            .outcomes
            .iter()
            .zip(outcome_probs.iter())
            .map(|(outcome, (_, p))| {
                let mut row =
                    crate::domain::diagram::DiscreteProbability::unconditioned(outcome.id);
                row.probability = *p;
                row
            })
            .collect();
        Issue::uncertainty(project_id, "U", uncertainty)
    }

    #[test]
    fn zero_probability_branches_are_removed() {
        let project_id = ProjectId::new();
        let u = uncertainty_with_probabilities(project_id, &[("a", 0.0), ("b", 1.0)]);
        let surviving = u.uncertainty_payload().unwrap().outcomes[1].id;
        let issues = vec![u.clone()];

        let mut tree = build_tree(&issues, &[u.id]);
        let solution = Solution::single(vec![], 0.0);
        DecisionTreePruner::new(&solution).prune(&mut tree).unwrap();

        let children = tree.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        let outcomes = &tree
            .node
            .issue()
            .unwrap()
            .uncertainty_payload()
            .unwrap()
            .outcomes;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id, surviving);
        let probabilities = tree.node.probabilities.as_ref().unwrap();
        assert_eq!(probabilities.len(), 1);
        assert_eq!(probabilities[0].probability_value, 1.0);
    }

    #[test]
    fn full_chain_prunes_to_optimal_path_with_positive_outcomes() {
        // D(yes,no) -> U(win p=0.4, lose p=0.0): the pruned tree is the
        // single optimal option followed by the surviving outcome.
        let project_id = ProjectId::new();
        let d = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![DecisionOption::new("yes"), DecisionOption::new("no")]),
        );
        let u = uncertainty_with_probabilities(project_id, &[("win", 0.4), ("lose", 0.0)]);
        let solution = Solution::single(vec![optimal(&d, 0)], 0.4);
        let issues = vec![d.clone(), u.clone()];

        let mut tree = build_tree(&issues, &[d.id, u.id]);
        DecisionTreePruner::new(&solution).prune(&mut tree).unwrap();

        // Root decision: one child.
        let children = tree.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        // Uncertainty level: only the positive-probability branch.
        let uncertainty_level = &children[0];
        let grandchildren = uncertainty_level.children.as_ref().unwrap();
        assert_eq!(grandchildren.len(), 1);
        assert!(grandchildren[0].node.is_endpoint());
    }

    #[test]
    fn uncertainty_without_probability_views_is_invalid() {
        let project_id = ProjectId::new();
        let u = Issue::uncertainty(
            project_id,
            "U",
            Uncertainty::key(vec![Outcome::new("a"), Outcome::new("b")]),
        );
        let issues = vec![u.clone()];

        // No probability rows: the builder leaves views unset.
        let mut tree = build_tree(&issues, &[u.id]);
        let solution = Solution::single(vec![], 0.0);
        let err = DecisionTreePruner::new(&solution)
            .prune(&mut tree)
            .unwrap_err();
        assert_eq!(
            err,
            PruningError::InvalidNode {
                kind: "uncertainty"
            }
        );
    }
}
