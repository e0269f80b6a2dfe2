//! Decision elimination order and partial order computation.
//!
//! The elimination order is obtained by repeatedly pruning childless
//! nodes from a working copy of the graph and recording focus decisions
//! in removal order (last taken first). The partial order then walks the
//! elimination sequence in reverse, interleaving each decision's key
//! uncertainty parents immediately before it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::diagram::{Edge, Issue};
use crate::domain::foundation::IssueId;
use crate::domain::graph::GraphTopology;

/// An ordering of issue identifiers consistent with information and
/// precedence constraints. Drives both table generation and tree
/// expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialOrder {
    issue_ids: Vec<IssueId>,
}

impl PartialOrder {
    pub fn new(issue_ids: Vec<IssueId>) -> Self {
        Self { issue_ids }
    }

    /// The ordered issue identifiers.
    pub fn ids(&self) -> &[IssueId] {
        &self.issue_ids
    }

    pub fn len(&self) -> usize {
        self.issue_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issue_ids.is_empty()
    }

    /// The first issue in the order (the tree root), if any.
    pub fn root(&self) -> Option<IssueId> {
        self.issue_ids.first().copied()
    }

    /// The issue following position `pos`, if any.
    pub fn successor_of(&self, pos: usize) -> Option<IssueId> {
        self.issue_ids.get(pos + 1).copied()
    }
}

/// Computes the decision elimination order and the partial order of a
/// validated diagram.
pub struct PartialOrderCalculator<'a> {
    issues: HashMap<IssueId, &'a Issue>,
    graph: GraphTopology<IssueId>,
}

impl<'a> PartialOrderCalculator<'a> {
    /// Builds the calculator over the full issue set and edge set.
    ///
    /// Expects validator output: the graph must be acyclic.
    pub fn new(issues: &'a [Issue], edges: &[Edge]) -> Self {
        let mut graph = GraphTopology::new();
        for issue in issues {
            graph.add_node(issue.id);
        }
        for edge in edges {
            graph.add_edge(edge.tail_issue, edge.head_issue);
        }
        Self {
            issues: issues.iter().map(|issue| (issue.id, issue)).collect(),
            graph,
        }
    }

    fn is_focus_decision(&self, id: IssueId) -> bool {
        self.issues
            .get(&id)
            .and_then(|issue| issue.decision_payload())
            .map(|decision| decision.is_focus())
            .unwrap_or(false)
    }

    fn is_key_uncertainty(&self, id: IssueId) -> bool {
        self.issues
            .get(&id)
            .and_then(|issue| issue.uncertainty_payload())
            .map(|uncertainty| uncertainty.is_key)
            .unwrap_or(false)
    }

    /// Focus decisions ordered from "last taken" to "first taken".
    ///
    /// Operates on a disposable copy of the graph: childless nodes are
    /// removed one sweep at a time, and focus decisions are recorded in
    /// removal order.
    pub fn decision_elimination_order(&self) -> Vec<IssueId> {
        let mut working = self.graph.clone();
        let mut decisions = Vec::new();
        let mut remaining = working
            .nodes()
            .filter(|&id| self.is_focus_decision(id))
            .count();

        while remaining > 0 {
            let snapshot: Vec<IssueId> = working.nodes().collect();
            let before = working.node_count();
            for node in snapshot {
                if !working.is_leaf(node) {
                    continue;
                }
                if self.is_focus_decision(node) {
                    decisions.push(node);
                    remaining -= 1;
                }
                working.remove_node(node);
            }
            if working.node_count() == before {
                // Unreachable on validator output; bail out rather than spin.
                warn!(remaining, "elimination sweep removed no nodes; graph is not acyclic");
                break;
            }
        }
        decisions
    }

    /// The partial order: every decision appears after the key
    /// uncertainties that directly gate it and before anything that
    /// depends on it; unclaimed key uncertainties follow at the end.
    pub fn partial_order(&self) -> PartialOrder {
        let mut key_uncertainties: Vec<IssueId> = self
            .graph
            .nodes()
            .filter(|&id| self.is_key_uncertainty(id))
            .collect();

        let mut elimination = self.decision_elimination_order();
        let mut order = Vec::new();

        // Pop from the end so decisions are visited first-taken first.
        while let Some(decision) = elimination.pop() {
            for &parent in self.graph.predecessors(decision) {
                if let Some(pos) = key_uncertainties.iter().position(|&u| u == parent) {
                    key_uncertainties.remove(pos);
                    order.push(parent);
                }
            }
            order.push(decision);
        }

        order.append(&mut key_uncertainties);
        PartialOrder::new(order)
    }
}
