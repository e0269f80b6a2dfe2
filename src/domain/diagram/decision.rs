//! Decision payload - a choice with an ordered set of options.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DecisionHierarchy, OptionId};

/// A single selectable option of a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub id: OptionId,
    pub name: String,
    /// Scalar utility contribution of choosing this option.
    pub utility: f64,
}

impl DecisionOption {
    /// Creates an option with zero utility contribution.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(),
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

/// Decision payload owned by exactly one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Hierarchy tag; only `Focus` decisions participate in table
    /// generation and elimination ordering.
    pub hierarchy: DecisionHierarchy,
    /// Ordered set of options.
    pub options: Vec<DecisionOption>,
}

impl Decision {
    /// Creates a focus decision with the given options.
    pub fn focus(options: Vec<DecisionOption>) -> Self {
        Self {
            hierarchy: DecisionHierarchy::Focus,
            options,
        }
    }

    /// Creates a decision with an explicit hierarchy tag.
    pub fn with_hierarchy(hierarchy: DecisionHierarchy, options: Vec<DecisionOption>) -> Self {
        Self { hierarchy, options }
    }

    /// True if the decision is in scope for the current analysis.
    pub fn is_focus(&self) -> bool {
        self.hierarchy == DecisionHierarchy::Focus
    }

    /// Identifiers of all options, in order.
    pub fn option_ids(&self) -> Vec<OptionId> {
        self.options.iter().map(|o| o.id).collect()
    }

    /// Looks up an option by identifier.
    pub fn option(&self, id: OptionId) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id == id)
    }
}
