//! Regenerates discrete probability/utility tables from parent structure.
//!
//! A table row exists for every (outcome × parent-combination) of an
//! uncertainty, or for every parent-combination of a utility node, where
//! the combinations are the Cartesian product of the relevant parents'
//! state sets. Relevant parents are in-scope key uncertainties and focus
//! decisions on deduplicated incoming edges. Analyst-entered values
//! survive regenerations that keep a row's key alive; stale rows are
//! dropped.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::diagram::{DiscreteProbability, DiscreteUtility, Edge, Issue};
use crate::domain::foundation::{IssueId, IssueKind, OptionId, OutcomeId, StateId, TableRowId};

/// Regenerates an issue's discrete table from the current diagram
/// structure.
pub struct DiscreteTableGenerator<'a> {
    issues: HashMap<IssueId, &'a Issue>,
    edges: &'a [Edge],
}

impl<'a> DiscreteTableGenerator<'a> {
    pub fn new(issues: &'a [Issue], edges: &'a [Edge]) -> Self {
        Self {
            issues: issues.iter().map(|issue| (issue.id, issue)).collect(),
            edges,
        }
    }

    /// Regenerated probability rows for an uncertainty issue.
    ///
    /// Returns `None` when the target is not an uncertainty. With no
    /// qualifying parents the table still has one row per outcome,
    /// probability zero pending later assignment.
    pub fn probability_rows(&self, target: &Issue) -> Option<Vec<DiscreteProbability>> {
        let uncertainty = target.uncertainty_payload()?;
        let (outcome_dims, option_dims) = self.relevant_parent_dimensions(target.id);

        // Retained values, keyed by (outcome, parent-combination).
        let mut existing: HashMap<(OutcomeId, BTreeSet<StateId>), &DiscreteProbability> =
            uncertainty
                .probabilities
                .iter()
                .map(|row| ((row.outcome_id, row.parent_states()), row))
                .collect();

        let mut rows = Vec::new();
        let all_combinations = combinations(&outcome_dims, &option_dims);
        for outcome in &uncertainty.outcomes {
            for combination in &all_combinations {
                let key = (outcome.id, combination.state_set());
                let (id, probability) = match existing.remove(&key) {
                    Some(row) => (row.id, row.probability),
                    None => (TableRowId::new(), 0.0),
                };
                rows.push(DiscreteProbability {
                    id,
                    outcome_id: outcome.id,
                    probability,
                    parent_option_ids: combination.options.clone(),
                    parent_outcome_ids: combination.outcomes.clone(),
                });
            }
        }
        Some(rows)
    }

    /// Regenerates the table owned by `target` in place, returning `true`
    /// when the issue carries a regenerable payload.
    pub fn apply_to(&self, target: &mut Issue) -> bool {
        if let Some(rows) = self.probability_rows(target) {
            if let Some(uncertainty) = target.uncertainty_payload_mut() {
                uncertainty.probabilities = rows;
                return true;
            }
        }
        if let Some(rows) = self.utility_rows(target) {
            if let Some(utility) = target.utility_payload_mut() {
                utility.rows = rows;
                return true;
            }
        }
        false
    }

    /// Regenerated utility rows for a utility issue.
    ///
    /// Returns `None` when the target is not a utility node. A utility
    /// table's dimensions come entirely from its parents, so with no
    /// qualifying parents the table is undefined and cleared.
    pub fn utility_rows(&self, target: &Issue) -> Option<Vec<DiscreteUtility>> {
        let utility = target.utility_payload()?;
        let (outcome_dims, option_dims) = self.relevant_parent_dimensions(target.id);
        if outcome_dims.is_empty() && option_dims.is_empty() {
            return Some(Vec::new());
        }

        let mut existing: HashMap<BTreeSet<StateId>, &DiscreteUtility> = utility
            .rows
            .iter()
            .map(|row| (row.parent_states(), row))
            .collect();

        let mut rows = Vec::new();
        for combination in combinations(&outcome_dims, &option_dims) {
            let (id, value) = match existing.remove(&combination.state_set()) {
                Some(row) => (row.id, row.value),
                None => (TableRowId::new(), 0.0),
            };
            rows.push(DiscreteUtility {
                id,
                value,
                parent_option_ids: combination.options.clone(),
                parent_outcome_ids: combination.outcomes.clone(),
            });
        }
        Some(rows)
    }

    /// One state-set dimension per relevant parent of `target`: outcomes
    /// of in-scope key uncertainties and options of in-scope focus
    /// decisions, over incoming edges deduplicated by (tail, head).
    fn relevant_parent_dimensions(
        &self,
        target: IssueId,
    ) -> (Vec<Vec<OutcomeId>>, Vec<Vec<OptionId>>) {
        let mut seen = HashSet::new();
        let mut outcome_dims = Vec::new();
        let mut option_dims = Vec::new();

        for edge in self.edges.iter().filter(|e| e.head_issue == target) {
            if !seen.insert(edge.endpoints()) {
                continue;
            }
            let Some(parent) = self.issues.get(&edge.tail_issue) else {
                continue;
            };
            if !parent.boundary.is_in_scope() {
                continue;
            }
            match parent.kind() {
                IssueKind::Uncertainty => {
                    if let Some(uncertainty) = parent.uncertainty_payload() {
                        if uncertainty.is_key {
                            outcome_dims.push(uncertainty.outcome_ids());
                        }
                    }
                }
                IssueKind::Decision => {
                    if let Some(decision) = parent.decision_payload() {
                        if decision.is_focus() {
                            option_dims.push(decision.option_ids());
                        }
                    }
                }
                _ => {}
            }
        }
        (outcome_dims, option_dims)
    }
}

/// One element of the Cartesian product of parent dimensions.
struct ParentCombination {
    outcomes: Vec<OutcomeId>,
    options: Vec<OptionId>,
}

impl ParentCombination {
    fn state_set(&self) -> BTreeSet<StateId> {
        self.outcomes
            .iter()
            .map(|&id| StateId::from(id))
            .chain(self.options.iter().map(|&id| StateId::from(id)))
            .collect()
    }
}

/// Full Cartesian product across outcome dimensions then option
/// dimensions. With no dimensions at all this is the single empty
/// combination.
fn combinations(
    outcome_dims: &[Vec<OutcomeId>],
    option_dims: &[Vec<OptionId>],
) -> Vec<ParentCombination> {
    let outcome_picks = product(outcome_dims);
    let option_picks = product(option_dims);
    let mut all = Vec::with_capacity(outcome_picks.len() * option_picks.len());
    for outcomes in &outcome_picks {
        for options in &option_picks {
            all.push(ParentCombination {
                outcomes: outcomes.clone(),
                options: options.clone(),
            });
        }
    }
    all
}

fn product<T: Copy>(dims: &[Vec<T>]) -> Vec<Vec<T>> {
    dims.iter().fold(vec![Vec::new()], |acc, dim| {
        acc.iter()
            .flat_map(|prefix| {
                dim.iter().map(move |&value| {
                    let mut extended = prefix.clone();
                    extended.push(value);
                    extended
                })
            })
            .collect()
    })
}
