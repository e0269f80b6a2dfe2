//! Materialized decision tree nodes.
//!
//! Tree nodes are ephemeral: rebuilt per request, never persisted. A
//! node wraps either a snapshot of a diagram issue or a synthesized
//! endpoint terminating a fully expanded branch.

use serde::{Deserialize, Serialize};

use crate::domain::diagram::Issue;
use crate::domain::foundation::{
    OutcomeId, ProjectId, StateId, TableRowId, TreeNodeId,
};

/// A synthesized terminal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointNode {
    pub project_id: ProjectId,
    /// Value at the endpoint, filled by presentation when available.
    pub value: Option<f64>,
}

impl EndpointNode {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            value: None,
        }
    }
}

/// What a tree node wraps: an issue snapshot or a synthesized endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodePayload {
    Issue(Issue),
    Endpoint(EndpointNode),
}

/// A probability row resolved for a node's position in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityView {
    pub outcome_id: OutcomeId,
    pub outcome_name: String,
    pub probability_value: f64,
    /// The discrete probability row this value came from.
    pub row_id: TableRowId,
}

/// A utility value resolved for one branch state of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityView {
    pub state_id: StateId,
    pub state_name: String,
    /// The state's own utility plus matched discrete utilities.
    pub utility_value: f64,
}

/// A materialized tree element.
///
/// Identity is derived, not arbitrary: after expansion every node's id is
/// a hash of its ancestor branch labels, so identical branch histories
/// always produce identical identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: TreeNodeId,
    pub payload: NodePayload,
    pub probabilities: Option<Vec<ProbabilityView>>,
    pub utilities: Option<Vec<UtilityView>>,
}

impl TreeNode {
    /// Wraps an issue snapshot under a fresh internal identifier.
    pub fn from_issue(issue: Issue) -> Self {
        Self {
            id: TreeNodeId::new(),
            payload: NodePayload::Issue(issue),
            probabilities: None,
            utilities: None,
        }
    }

    /// Synthesizes an endpoint node.
    pub fn endpoint(project_id: ProjectId) -> Self {
        Self {
            id: TreeNodeId::new(),
            payload: NodePayload::Endpoint(EndpointNode::new(project_id)),
            probabilities: None,
            utilities: None,
        }
    }

    pub fn is_endpoint(&self) -> bool {
        matches!(self.payload, NodePayload::Endpoint(_))
    }

    /// The wrapped issue, if this is not an endpoint.
    pub fn issue(&self) -> Option<&Issue> {
        match &self.payload {
            NodePayload::Issue(issue) => Some(issue),
            NodePayload::Endpoint(_) => None,
        }
    }

    /// Mutable access to the wrapped issue.
    pub fn issue_mut(&mut self) -> Option<&mut Issue> {
        match &mut self.payload {
            NodePayload::Issue(issue) => Some(issue),
            NodePayload::Endpoint(_) => None,
        }
    }
}

/// A decision tree: a node plus its child subtrees.
///
/// A leaf has no children; an endpoint node is always a leaf.
/// Serializes as `{ "tree_node": {...}, "children": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    #[serde(rename = "tree_node")]
    pub node: TreeNode,
    pub children: Option<Vec<DecisionTree>>,
}

impl DecisionTree {
    /// A leaf subtree.
    pub fn leaf(node: TreeNode) -> Self {
        Self {
            node,
            children: None,
        }
    }

    /// A subtree with children; an empty list is normalized to a leaf.
    pub fn with_children(node: TreeNode, children: Vec<DecisionTree>) -> Self {
        Self {
            node,
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().map(Vec::is_empty).unwrap_or(true)
    }

    /// Total number of nodes in the subtree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(DecisionTree::node_count)
            .sum::<usize>()
    }

    /// Leaf count of the subtree.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children
                .iter()
                .flatten()
                .map(DecisionTree::leaf_count)
                .sum()
        }
    }
}
