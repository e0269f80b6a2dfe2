//! Utility payload - a value node with a discrete utility table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{OptionId, OutcomeId, StateId, TableRowId};

/// One row of a discrete utility table, keyed by a parent-state
/// combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteUtility {
    pub id: TableRowId,
    pub value: f64,
    pub parent_option_ids: Vec<OptionId>,
    pub parent_outcome_ids: Vec<OutcomeId>,
}

impl DiscreteUtility {
    /// The combined parent-state set this row is keyed by.
    pub fn parent_states(&self) -> BTreeSet<StateId> {
        self.parent_option_ids
            .iter()
            .map(|id| StateId::from(*id))
            .chain(self.parent_outcome_ids.iter().map(|id| StateId::from(*id)))
            .collect()
    }
}

/// Utility payload owned by exactly one issue.
///
/// A utility table's dimensions are determined entirely by the node's
/// relevant parents; with no qualifying parents the table is undefined
/// (empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Utility {
    pub rows: Vec<DiscreteUtility>,
}

impl Utility {
    /// Creates an empty utility payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a utility payload with the given table rows.
    pub fn with_rows(rows: Vec<DiscreteUtility>) -> Self {
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_states_deduplicate_across_kinds() {
        let option_id = OptionId::new();
        let row = DiscreteUtility {
            id: TableRowId::new(),
            value: 10.0,
            parent_option_ids: vec![option_id, option_id],
            parent_outcome_ids: vec![],
        };
        assert_eq!(row.parent_states().len(), 1);
    }

    #[test]
    fn new_utility_has_no_rows() {
        assert!(Utility::new().rows.is_empty());
    }
}
