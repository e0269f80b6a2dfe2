//! Materializes an influence diagram into an explicit decision tree.
//!
//! Expansion is stack-based rather than recursive, so call depth never
//! depends on diagram size. Every node of the partial order appearing
//! under a new ancestor branch becomes a fresh duplicate in an arena, so
//! a diagram node reachable via multiple paths yields independent tree
//! nodes and later mutation (pruning) cannot alias.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::diagram::Issue;
use crate::domain::foundation::{IssueId, StateId, TreeNodeId};
use crate::domain::graph::GraphTopology;
use crate::domain::ordering::PartialOrder;

use super::node::{DecisionTree, NodePayload, ProbabilityView, TreeNode, UtilityView};

/// Failures raised while materializing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeBuildError {
    #[error("cannot materialize a tree from an empty partial order")]
    EmptyPartialOrder,

    #[error("partial order references unknown issue {0}")]
    UnknownIssue(IssueId),
}

/// Work pending on the expansion stack.
enum WorkItem {
    /// Expand a live tree node at a position of the partial order.
    Expand { node: TreeNodeId, position: usize },
    /// Attach a head to a branch emitted at `position`.
    Branch {
        tail: TreeNodeId,
        label: StateId,
        position: usize,
    },
}

/// Builds decision trees from a partial order and the issue set behind it.
pub struct DecisionTreeBuilder<'a> {
    issues: HashMap<IssueId, &'a Issue>,
    /// Option/outcome display names across the whole diagram.
    state_names: HashMap<StateId, String>,
    /// Discrete utility values keyed by their parent-state combination.
    utility_lookup: HashMap<BTreeSet<StateId>, Vec<f64>>,
    max_depth: usize,
}

impl<'a> DecisionTreeBuilder<'a> {
    pub fn new(issues: &'a [Issue], config: &EngineConfig) -> Self {
        let mut state_names = HashMap::new();
        let mut utility_lookup: HashMap<BTreeSet<StateId>, Vec<f64>> = HashMap::new();

        for issue in issues {
            if let Some(decision) = issue.decision_payload() {
                for option in &decision.options {
                    state_names.insert(StateId::from(option.id), option.name.clone());
                }
            }
            if let Some(uncertainty) = issue.uncertainty_payload() {
                for outcome in &uncertainty.outcomes {
                    state_names.insert(StateId::from(outcome.id), outcome.name.clone());
                }
            }
            if let Some(utility) = issue.utility_payload() {
                for row in &utility.rows {
                    if row.value != 0.0 {
                        utility_lookup
                            .entry(row.parent_states())
                            .or_default()
                            .push(row.value);
                    }
                }
            }
        }

        Self {
            issues: issues.iter().map(|issue| (issue.id, issue)).collect(),
            state_names,
            utility_lookup,
            max_depth: config.max_ancestor_depth,
        }
    }

    /// Materializes the full decision tree for the given partial order.
    ///
    /// # Errors
    ///
    /// - [`TreeBuildError::EmptyPartialOrder`] when there is nothing to expand
    /// - [`TreeBuildError::UnknownIssue`] when the order references an
    ///   issue missing from the issue set
    pub fn build(&self, order: &PartialOrder) -> Result<DecisionTree, TreeBuildError> {
        let root_issue = order.root().ok_or(TreeBuildError::EmptyPartialOrder)?;
        let project_id = self
            .issues
            .get(&root_issue)
            .ok_or(TreeBuildError::UnknownIssue(root_issue))?
            .project_id;

        let mut arena: HashMap<TreeNodeId, TreeNode> = HashMap::new();
        let mut topology: GraphTopology<TreeNodeId, StateId> = GraphTopology::new();

        let root = self.instantiate(root_issue, &mut arena, &mut topology)?;
        let mut stack = vec![WorkItem::Expand {
            node: root,
            position: 0,
        }];

        while let Some(item) = stack.pop() {
            match item {
                WorkItem::Expand { node, position } => {
                    let branches = pending_branches(&arena[&node]);
                    // Reversed so branches are attached in natural order
                    // once popped again.
                    for &label in branches.iter().rev() {
                        stack.push(WorkItem::Branch {
                            tail: node,
                            label,
                            position,
                        });
                    }
                }
                WorkItem::Branch {
                    tail,
                    label,
                    position,
                } => match order.successor_of(position) {
                    Some(next_issue) => {
                        // Fresh duplicate: the same diagram node under two
                        // ancestor branches must become two tree nodes.
                        let duplicate = self.instantiate(next_issue, &mut arena, &mut topology)?;
                        topology.add_labeled_edge(tail, duplicate, label);
                        stack.push(WorkItem::Expand {
                            node: duplicate,
                            position: position + 1,
                        });
                    }
                    None => {
                        let endpoint = TreeNode::endpoint(project_id);
                        let endpoint_id = endpoint.id;
                        arena.insert(endpoint_id, endpoint);
                        topology.add_labeled_edge(tail, endpoint_id, label);
                    }
                },
            }
        }

        debug!(
            nodes = arena.len(),
            order_len = order.len(),
            "decision tree materialized"
        );
        Ok(self.finalize(root, &arena, &topology))
    }

    /// Clones the issue template into the arena under a fresh identifier.
    fn instantiate(
        &self,
        issue_id: IssueId,
        arena: &mut HashMap<TreeNodeId, TreeNode>,
        topology: &mut GraphTopology<TreeNodeId, StateId>,
    ) -> Result<TreeNodeId, TreeBuildError> {
        let issue = self
            .issues
            .get(&issue_id)
            .ok_or(TreeBuildError::UnknownIssue(issue_id))?;
        let node = TreeNode::from_issue((*issue).clone());
        let id = node.id;
        arena.insert(id, node);
        topology.add_node(id);
        Ok(id)
    }

    /// Post-pass: derives stable identifiers from ancestor branch labels
    /// and attaches resolved probability/utility views.
    fn finalize(
        &self,
        root: TreeNodeId,
        arena: &HashMap<TreeNodeId, TreeNode>,
        topology: &GraphTopology<TreeNodeId, StateId>,
    ) -> DecisionTree {
        let mut labels = Vec::new();
        self.finalize_node(root, &mut labels, arena, topology)
    }

    fn finalize_node(
        &self,
        id: TreeNodeId,
        labels: &mut Vec<StateId>,
        arena: &HashMap<TreeNodeId, TreeNode>,
        topology: &GraphTopology<TreeNodeId, StateId>,
    ) -> DecisionTree {
        let mut node = arena[&id].clone();
        node.id = TreeNodeId::derive_from_path(&path_string(labels.as_slice()));
        node.probabilities = self.probability_views(&node, labels.as_slice());
        node.utilities = self.utility_views(&node, labels.as_slice());

        if labels.len() >= self.max_depth {
            warn!(depth = labels.len(), "ancestor depth cap reached; truncating tree");
            return DecisionTree::with_children(node, Vec::new());
        }

        let mut children = Vec::new();
        for &child in topology.successors(id) {
            let Some(&label) = topology.edge_label(id, child) else {
                continue;
            };
            labels.push(label);
            children.push(self.finalize_node(child, labels, arena, topology));
            labels.pop();
        }
        DecisionTree::with_children(node, children)
    }

    /// Probability rows whose parent-state combinations are subsets of
    /// the node's ancestor branch labels.
    fn probability_views(
        &self,
        node: &TreeNode,
        labels: &[StateId],
    ) -> Option<Vec<ProbabilityView>> {
        let uncertainty = node.issue()?.uncertainty_payload()?;
        if uncertainty.probabilities.is_empty() {
            return None;
        }
        let ancestors: BTreeSet<StateId> = labels.iter().copied().collect();
        let views: Vec<ProbabilityView> = uncertainty
            .probabilities
            .iter()
            .filter(|row| row.parent_states().is_subset(&ancestors))
            .filter_map(|row| {
                let name = self.state_names.get(&StateId::from(row.outcome_id))?;
                Some(ProbabilityView {
                    outcome_id: row.outcome_id,
                    outcome_name: name.clone(),
                    probability_value: row.probability,
                    row_id: row.id,
                })
            })
            .collect();
        if views.is_empty() {
            None
        } else {
            Some(views)
        }
    }

    /// Per-state utility views: each option/outcome's own utility plus
    /// any discrete utility matched against the ancestor-and-self labels.
    fn utility_views(&self, node: &TreeNode, labels: &[StateId]) -> Option<Vec<UtilityView>> {
        let issue = node.issue()?;
        let mut views = Vec::new();

        if let Some(uncertainty) = issue.uncertainty_payload() {
            for outcome in &uncertainty.outcomes {
                let state = StateId::from(outcome.id);
                views.push(UtilityView {
                    state_id: state,
                    state_name: outcome.name.clone(),
                    utility_value: outcome.utility + self.discrete_utility_value(labels, state),
                });
            }
        } else if let Some(decision) = issue.decision_payload() {
            for option in &decision.options {
                let state = StateId::from(option.id);
                views.push(UtilityView {
                    state_id: state,
                    state_name: option.name.clone(),
                    utility_value: option.utility + self.discrete_utility_value(labels, state),
                });
            }
        }

        if views.is_empty() {
            None
        } else {
            Some(views)
        }
    }

    /// Sum of stored discrete utilities whose parent-state key contains
    /// the node's own label, has at least two members, and lies within
    /// the ancestor-and-self label set. Each stored row contributes at
    /// most once.
    fn discrete_utility_value(&self, labels: &[StateId], own: StateId) -> f64 {
        if labels.is_empty() {
            return 0.0;
        }
        let mut path: BTreeSet<StateId> = labels.iter().copied().collect();
        path.insert(own);

        self.utility_lookup
            .iter()
            .filter(|(key, _)| key.contains(&own) && key.len() >= 2 && key.is_subset(&path))
            .map(|(_, values)| values.iter().sum::<f64>())
            .sum()
    }
}

/// One pending branch label per option/outcome of the node, in natural
/// order. Endpoint and payload-free nodes expand to nothing.
fn pending_branches(node: &TreeNode) -> Vec<StateId> {
    let Some(issue) = node.issue() else {
        return Vec::new();
    };
    if let Some(decision) = issue.decision_payload() {
        decision
            .options
            .iter()
            .map(|option| StateId::from(option.id))
            .collect()
    } else if let Some(uncertainty) = issue.uncertainty_payload() {
        uncertainty
            .outcomes
            .iter()
            .map(|outcome| StateId::from(outcome.id))
            .collect()
    } else {
        Vec::new()
    }
}

/// The stable identity string of a node: its ancestor branch labels from
/// the root, prefixed with the root sentinel.
fn path_string(labels: &[StateId]) -> String {
    let mut parts = Vec::with_capacity(labels.len() + 1);
    parts.push("root".to_string());
    parts.extend(labels.iter().map(StateId::to_string));
    parts.join(" - ")
}
