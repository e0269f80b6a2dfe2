//! PruneOptimalTreeHandler - materializes a tree and prunes it down to
//! the solver's optimal policy.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::foundation::ProjectId;
use crate::domain::ordering::PartialOrderCalculator;
use crate::domain::tree::{DecisionTree, DecisionTreeBuilder, DecisionTreePruner};
use crate::domain::validation::{DiagramValidator, ValidatedDiagram};
use crate::ports::{DiagramReader, PolicySolver};

use super::super::EngineError;

/// Command to produce the optimal-path tree for a project's diagram.
#[derive(Debug, Clone)]
pub struct PruneOptimalTreeCommand {
    pub project_id: ProjectId,
}

/// Handler producing pruned optimal-path trees.
pub struct PruneOptimalTreeHandler {
    reader: Arc<dyn DiagramReader>,
    solver: Arc<dyn PolicySolver>,
    config: EngineConfig,
}

impl PruneOptimalTreeHandler {
    pub fn new(
        reader: Arc<dyn DiagramReader>,
        solver: Arc<dyn PolicySolver>,
        config: EngineConfig,
    ) -> Self {
        Self {
            reader,
            solver,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: PruneOptimalTreeCommand,
    ) -> Result<DecisionTree, EngineError> {
        // 1. Load the diagram, in display order so results are stable
        //    regardless of storage order
        let (mut issues, edges) = self.reader.influence_diagram(cmd.project_id).await?;
        issues.sort_by_key(|issue| (issue.order, issue.id));

        // 2. Validate on a worker thread; the solver consumes the
        //    validated (possibly fragment-filtered) pair.
        let config = self.config.clone();
        let validated = tokio::task::spawn_blocking(
            move || -> Result<ValidatedDiagram, EngineError> {
                let mut validator = DiagramValidator::new(&config);
                Ok(validator.validate(issues, edges)?)
            },
        )
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))??;

        // 3. Solve the policy externally
        let solution = self
            .solver
            .solve(&validated.issues, &validated.edges)
            .await?;

        // 4. Order, expand and prune on a worker thread
        let config = self.config.clone();
        let tree = tokio::task::spawn_blocking(move || -> Result<DecisionTree, EngineError> {
            let order =
                PartialOrderCalculator::new(&validated.issues, &validated.edges).partial_order();
            let builder = DecisionTreeBuilder::new(&validated.issues, &config);
            let mut tree = builder.build(&order)?;
            DecisionTreePruner::new(&solution).prune(&mut tree)?;
            Ok(tree)
        })
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))??;

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagram::{
        Decision, DecisionOption, DiscreteProbability, Edge, Issue, Outcome, Uncertainty,
    };
    use crate::domain::foundation::DomainError;
    use crate::domain::solution::{OptimalOption, Solution};
    use async_trait::async_trait;

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
        async fn solve(
            &self,
            _issues: &[Issue],
            _edges: &[Edge],
        ) -> Result<Solution, DomainError> {
            Ok(self.solution.clone())
        }
    }

    fn probability_rows(uncertainty: &Uncertainty, values: &[f64]) -> Vec<DiscreteProbability> {
        uncertainty
            .outcomes
            .iter()
            .zip(values)
            .map(|(outcome, &p)| {
                let mut row = DiscreteProbability::unconditioned(outcome.id);
                row.probability = p;
                row
            })
            .collect()
    }

    #[tokio::test]
    async fn handler_reduces_to_the_single_optimal_path() {
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
            let rows = probability_rows(uncertainty, &[1.0, 0.0]);
            uncertainty.probabilities = rows;
        }

        let optimal = {
            let option = &d.decision_payload().unwrap().options[0];
            OptimalOption {
                decision_id: d.id,
                option_id: option.id,
                option_name: option.name.clone(),
                parent_states: vec![],
                expected_value: 1.0,
            }
        };
        let optimal_option_id = optimal.option_id;

        let reader = StaticDiagramReader {
            edges: vec![Edge::new(project_id, d.id, u.id)],
            issues: vec![d, u],
        };
        let solver = StaticPolicySolver {
            solution: Solution::single(vec![optimal], 1.0),
        };

        let handler = PruneOptimalTreeHandler::new(
            Arc::new(reader),
            Arc::new(solver),
            EngineConfig::default(),
        );
        let tree = handler
            .handle(PruneOptimalTreeCommand { project_id })
            .await
            .unwrap();

        // Decision level: one surviving branch, the optimal option.
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
        assert_eq!(options[0].id, optimal_option_id);

        // Uncertainty level: only the p=1.0 outcome survives.
        let grandchildren = children[0].children.as_ref().unwrap();
        assert_eq!(grandchildren.len(), 1);
        assert!(grandchildren[0].node.is_endpoint());
    }

    #[tokio::test]
    async fn policy_mismatch_is_fatal() {
        let project_id = ProjectId::new();
        let d = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![DecisionOption::new("yes")]),
        );
        let mut u = Issue::uncertainty(
            project_id,
            "U",
            Uncertainty::key(vec![Outcome::new("win")]),
        );
        {
            let uncertainty = u.uncertainty_payload_mut().unwrap();
            let rows = probability_rows(uncertainty, &[1.0]);
            uncertainty.probabilities = rows;
        }

        let reader = StaticDiagramReader {
            edges: vec![Edge::new(project_id, d.id, u.id)],
            issues: vec![d, u],
        };
        // Empty policy: the decision is not covered.
        let solver = StaticPolicySolver {
            solution: Solution::single(vec![], 0.0),
        };

        let handler = PruneOptimalTreeHandler::new(
            Arc::new(reader),
            Arc::new(solver),
            EngineConfig::default(),
        );
        let err = handler
            .handle(PruneOptimalTreeCommand { project_id })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Pruning(_)));
    }
}
