//! Diagram validator with largest-fragment self-repair.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::diagram::{Edge, Issue};
use crate::domain::foundation::{IssueId, IssueKind};
use crate::domain::graph::GraphTopology;

use super::errors::{
    DiagramError, RecursionLimitError, StructuralValidationError, ValidationCode,
    ValidationFailure,
};

/// A validated `(issues, edges)` pair, possibly filtered to the largest
/// weakly-connected fragment.
#[derive(Debug, Clone)]
pub struct ValidatedDiagram {
    pub issues: Vec<Issue>,
    pub edges: Vec<Edge>,
}

/// Validates that a diagram is a well-formed, acyclic decision model.
///
/// When the diagram splits into disjoint fragments the validator repairs
/// it by retaining only the largest fragment and re-validating; repair
/// passes are bounded by the configured reconstruction limit. The pass
/// counter is instance-scoped and resets after a successful repair, so a
/// reused validator never trips the bound on an unrelated diagram.
#[derive(Debug)]
pub struct DiagramValidator {
    max_reconstructions: u32,
    reconstructions: u32,
}

impl DiagramValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_reconstructions: config.max_reconstructions,
            reconstructions: 0,
        }
    }

    /// Validates the diagram, repairing disjoint fragments if needed.
    ///
    /// # Errors
    ///
    /// - [`StructuralValidationError`] aggregating every failure found
    /// - [`RecursionLimitError`] if fragment filtering fails to converge
    ///   within the reconstruction bound
    pub fn validate(
        &mut self,
        mut issues: Vec<Issue>,
        mut edges: Vec<Edge>,
    ) -> Result<ValidatedDiagram, DiagramError> {
        loop {
            let analysis = TopologyAnalysis::build(&edges);
            let failures = structural_failures(&issues, &edges, &analysis);
            if !failures.is_empty() {
                return Err(StructuralValidationError { failures }.into());
            }

            let fragments = analysis.separated_fragments();
            if fragments.len() <= 1 {
                self.reconstructions = 0;
                debug!(
                    issues = issues.len(),
                    edges = edges.len(),
                    "influence diagram validated"
                );
                return Ok(ValidatedDiagram { issues, edges });
            }

            self.reconstructions += 1;
            if self.reconstructions > self.max_reconstructions {
                return Err(RecursionLimitError {
                    attempts: self.reconstructions,
                }
                .into());
            }

            let largest = fragments
                .iter()
                .max_by_key(|fragment| fragment.len())
                .cloned()
                .unwrap_or_default();
            let mut sizes: Vec<usize> = fragments.iter().map(HashSet::len).collect();
            sizes.sort_unstable_by(|a, b| b.cmp(a));
            warn!(
                fragments = fragments.len(),
                sizes = ?sizes,
                retained = largest.len(),
                pass = self.reconstructions,
                "diagram split into disjoint fragments; retaining the largest"
            );

            issues.retain(|issue| largest.contains(&issue.id));
            edges.retain(|edge| {
                largest.contains(&edge.tail_issue) && largest.contains(&edge.head_issue)
            });
        }
    }
}

/// Start/end node analysis plus the edge-level topology.
struct TopologyAnalysis {
    start_nodes: HashSet<IssueId>,
    end_nodes: HashSet<IssueId>,
    graph: GraphTopology<IssueId>,
}

impl TopologyAnalysis {
    fn build(edges: &[Edge]) -> Self {
        let all_tails: HashSet<IssueId> = edges.iter().map(|e| e.tail_issue).collect();
        let all_heads: HashSet<IssueId> = edges.iter().map(|e| e.head_issue).collect();

        let mut graph = GraphTopology::new();
        for edge in edges {
            graph.add_edge(edge.tail_issue, edge.head_issue);
        }

        Self {
            // Nodes with no incoming edges.
            start_nodes: all_tails.difference(&all_heads).copied().collect(),
            // Nodes with no outgoing edges.
            end_nodes: all_heads.difference(&all_tails).copied().collect(),
            graph,
        }
    }

    /// Weakly-connected fragments: depth-first reachability from every
    /// start node, merging traversals that share any node.
    fn separated_fragments(&self) -> Vec<HashSet<IssueId>> {
        let mut start_nodes: Vec<IssueId> = self.start_nodes.iter().copied().collect();
        start_nodes.sort_unstable();

        let paths: Vec<HashSet<IssueId>> = start_nodes
            .into_iter()
            .map(|start| self.graph.depth_first_reachable(start))
            .collect();
        merge_overlapping_sets(paths)
    }
}

/// Merges sets that share at least one element, until no two sets overlap.
fn merge_overlapping_sets(mut sets: Vec<HashSet<IssueId>>) -> Vec<HashSet<IssueId>> {
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..sets.len() {
            for j in (i + 1)..sets.len() {
                if !sets[i].is_disjoint(&sets[j]) {
                    let absorbed = sets.swap_remove(j);
                    sets[i].extend(absorbed);
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
    sets
}

fn structural_failures(
    issues: &[Issue],
    edges: &[Edge],
    analysis: &TopologyAnalysis,
) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    if analysis.start_nodes.is_empty() && analysis.end_nodes.is_empty() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoStartOrEndNodes,
            "no start nodes (nodes with no incoming edges) and no end nodes \
             (nodes with no outgoing edges) found.",
        ));
    } else if analysis.start_nodes.is_empty() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoStartNodes,
            "no start nodes (nodes with no incoming edges) found.",
        ));
    } else if analysis.end_nodes.is_empty() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoEndNodes,
            "no end nodes (nodes with no outgoing edges) found.",
        ));
    }

    if edges.is_empty() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoEdges,
            "no edges found.",
        ));
    }

    if issues.is_empty() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoIssues,
            "no issues found.",
        ));
    }

    if analysis.graph.has_cycle() {
        failures.push(ValidationFailure::new(
            ValidationCode::NoLoops,
            "cycle in influence diagram detected.",
        ));
    }

    for issue in issues {
        match issue.kind() {
            IssueKind::Uncertainty => {
                let has_outcomes = issue
                    .uncertainty_payload()
                    .map(|u| !u.outcomes.is_empty())
                    .unwrap_or(false);
                if !has_outcomes {
                    failures.push(ValidationFailure::new(
                        ValidationCode::UncertaintyOutcomes,
                        format!("no outcomes found for uncertainty {}.", issue.name),
                    ));
                }
            }
            IssueKind::Decision => {
                let has_options = issue
                    .decision_payload()
                    .map(|d| !d.options.is_empty())
                    .unwrap_or(false);
                if !has_options {
                    failures.push(ValidationFailure::new(
                        ValidationCode::DecisionOptions,
                        format!("no options found for decision {}.", issue.name),
                    ));
                }
            }
            _ => {}
        }
    }

    failures
}
