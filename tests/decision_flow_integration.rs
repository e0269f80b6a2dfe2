//! End-to-end flow: validate → order → build → solve → prune.
//!
//! Exercises the full engine over the two-node scenario: a decision
//! `D(yes, no)` feeding an uncertainty `U(win, lose)`.

use std::sync::Arc;

use async_trait::async_trait;

use decision_loom::application::handlers::{
    BuildDecisionTreeCommand, BuildDecisionTreeHandler, ComputePartialOrderCommand,
    ComputePartialOrderHandler, PruneOptimalTreeCommand, PruneOptimalTreeHandler,
};
use decision_loom::config::EngineConfig;
use decision_loom::domain::diagram::{
    Decision, DecisionOption, DiscreteProbability, Edge, Issue, Outcome, Uncertainty,
};
use decision_loom::domain::foundation::{DomainError, ProjectId, TreeNodeId};
use decision_loom::domain::solution::{OptimalOption, Solution};
use decision_loom::ports::{DiagramReader, PolicySolver};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

struct StaticDiagramReader {
    issues: Vec<Issue>,
    edges: Vec<Edge>,
}

#[async_trait]
impl DiagramReader for StaticDiagramReader {
    async fn influence_diagram(
        &self,
        _project_id: ProjectId,
    ) -> Result<(Vec<Issue>, Vec<Edge>), DomainError> {
        Ok((self.issues.clone(), self.edges.clone()))
    }
}

struct StaticPolicySolver {
    solution: Solution,
}

#[async_trait]
impl PolicySolver for StaticPolicySolver {
    async fn solve(&self, _issues: &[Issue], _edges: &[Edge]) -> Result<Solution, DomainError> {
        Ok(self.solution.clone())
    }
}

/// The scenario diagram plus the identifiers the assertions need.
struct Scenario {
    project_id: ProjectId,
    issues: Vec<Issue>,
    edges: Vec<Edge>,
    decision_id: decision_loom::domain::foundation::IssueId,
    uncertainty_id: decision_loom::domain::foundation::IssueId,
    yes_option: decision_loom::domain::foundation::OptionId,
}

fn scenario(win_probability: f64, lose_probability: f64) -> Scenario {
    let project_id = ProjectId::new();
    let d = Issue::decision(
        project_id,
        "D",
        Decision::focus(vec![DecisionOption::new("yes"), DecisionOption::new("no")]),
    );
    let mut u = Issue::uncertainty(
        project_id,
        "U",
        Uncertainty::key(vec![Outcome::new("win"), Outcome::new("lose")]),
    );
    {
        let uncertainty = u.uncertainty_payload_mut().unwrap();
        let rows: Vec<DiscreteProbability> = uncertainty
            .outcomes
            .iter()
            .zip([win_probability, lose_probability])
            .map(|(outcome, p)| {
                let mut row = DiscreteProbability::unconditioned(outcome.id);
                row.probability = p;
                row
            })
            .collect();
        uncertainty.probabilities = rows;
    }

    let edges = vec![Edge::new(project_id, d.id, u.id)];
    Scenario {
        project_id,
        decision_id: d.id,
        uncertainty_id: u.id,
        yes_option: d.decision_payload().unwrap().options[0].id,
        issues: vec![d, u],
        edges,
    }
}

#[tokio::test]
async fn partial_order_places_the_decision_before_the_uncertainty() {
    init_tracing();
    let scenario = scenario(0.5, 0.5);
    let reader = StaticDiagramReader {
        issues: scenario.issues.clone(),
        edges: scenario.edges.clone(),
    };

    let handler = ComputePartialOrderHandler::new(Arc::new(reader), EngineConfig::default());
    let order = handler
        .handle(ComputePartialOrderCommand {
            project_id: scenario.project_id,
        })
        .await
        .unwrap();

    assert_eq!(order.ids(), &[scenario.decision_id, scenario.uncertainty_id]);
}

#[tokio::test]
async fn materialized_tree_unrolls_every_branch() {
    init_tracing();
    let scenario = scenario(0.5, 0.5);
    let reader = StaticDiagramReader {
        issues: scenario.issues.clone(),
        edges: scenario.edges.clone(),
    };

    let handler = BuildDecisionTreeHandler::new(Arc::new(reader), EngineConfig::default());
    let tree = handler
        .handle(BuildDecisionTreeCommand {
            project_id: scenario.project_id,
        })
        .await
        .unwrap();

    // Root is the decision with one child per option.
    assert_eq!(tree.node.issue().unwrap().id, scenario.decision_id);
    let children = tree.children.as_ref().unwrap();
    assert_eq!(children.len(), 2);

    // Each branch holds its own duplicate of the uncertainty.
    let mut uncertainty_copies = std::collections::HashSet::new();
    let mut endpoints = std::collections::HashSet::new();
    for child in children {
        assert_eq!(child.node.issue().unwrap().id, scenario.uncertainty_id);
        uncertainty_copies.insert(child.node.id);

        let leaves = child.children.as_ref().unwrap();
        assert_eq!(leaves.len(), 2);
        for leaf in leaves {
            assert!(leaf.node.is_endpoint());
            assert!(leaf.is_leaf());
            endpoints.insert(leaf.node.id);
        }
    }
    assert_eq!(uncertainty_copies.len(), 2);
    assert_eq!(endpoints.len(), 4);

    // Identity is derived from branch history, so a rebuild reproduces it.
    let rebuilt = {
        let reader = StaticDiagramReader {
            issues: scenario.issues.clone(),
            edges: scenario.edges.clone(),
        };
        BuildDecisionTreeHandler::new(Arc::new(reader), EngineConfig::default())
            .handle(BuildDecisionTreeCommand {
                project_id: scenario.project_id,
            })
            .await
            .unwrap()
    };
    let rebuilt_children: Vec<TreeNodeId> = rebuilt
        .children
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.node.id)
        .collect();
    let original_children: Vec<TreeNodeId> =
        children.iter().map(|c| c.node.id).collect();
    assert_eq!(rebuilt_children, original_children);
}

#[tokio::test]
async fn solved_policy_prunes_to_the_optimal_path() {
    init_tracing();
    // "lose" carries probability zero, so the pruned tree is one path.
    let scenario = scenario(1.0, 0.0);
    let reader = StaticDiagramReader {
        issues: scenario.issues.clone(),
        edges: scenario.edges.clone(),
    };
    let solver = StaticPolicySolver {
        solution: Solution::single(
            vec![OptimalOption {
                decision_id: scenario.decision_id,
                option_id: scenario.yes_option,
                option_name: "yes".to_string(),
                parent_states: vec![],
                expected_value: 1.0,
            }],
            1.0,
        ),
    };

    let handler = PruneOptimalTreeHandler::new(
        Arc::new(reader),
        Arc::new(solver),
        EngineConfig::default(),
    );
    let tree = handler
        .handle(PruneOptimalTreeCommand {
            project_id: scenario.project_id,
        })
        .await
        .unwrap();

    // Decision level: exactly the optimal option survives.
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
    assert_eq!(options[0].id, scenario.yes_option);

    // Uncertainty level: only the certain outcome remains, and it ends in
    // an endpoint leaf.
    let uncertainty_level = &children[0];
    assert_eq!(
        uncertainty_level.node.issue().unwrap().id,
        scenario.uncertainty_id
    );
    let leaves = uncertainty_level.children.as_ref().unwrap();
    assert_eq!(leaves.len(), 1);
    assert!(leaves[0].node.is_endpoint());

    // The whole pruned tree is a single path of three nodes.
    assert_eq!(tree.node_count(), 3);
}
