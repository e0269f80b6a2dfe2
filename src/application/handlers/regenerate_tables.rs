//! RegenerateTablesHandler - recomputes an issue's discrete table from
//! its current parent structure.
//!
//! Triggered whenever parent structure changes, to keep probability and
//! utility tables consistent with the graph. The regenerated issue is
//! returned to the caller; persisting it is the caller's concern.

use std::sync::Arc;

use crate::domain::diagram::Issue;
use crate::domain::foundation::{DomainError, ErrorCode, IssueId, ProjectId};
use crate::domain::tables::DiscreteTableGenerator;
use crate::ports::DiagramReader;

use super::super::EngineError;

/// Command to regenerate the table of one issue.
#[derive(Debug, Clone)]
pub struct RegenerateTablesCommand {
    pub project_id: ProjectId,
    pub issue_id: IssueId,
}

/// Handler regenerating discrete tables.
pub struct RegenerateTablesHandler {
    reader: Arc<dyn DiagramReader>,
}

impl RegenerateTablesHandler {
    pub fn new(reader: Arc<dyn DiagramReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(&self, cmd: RegenerateTablesCommand) -> Result<Issue, EngineError> {
        // 1. Load the diagram
        let (issues, edges) = self.reader.influence_diagram(cmd.project_id).await?;

        // 2. Locate the target issue
        let mut target = issues
            .iter()
            .find(|issue| issue.id == cmd.issue_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::new(ErrorCode::IssueNotFound, "issue not found in project scope")
                    .with_detail("issue_id", cmd.issue_id.to_string())
            })?;

        // 3. Rewrite its table against the current parent structure
        let generator = DiscreteTableGenerator::new(&issues, &edges);
        if !generator.apply_to(&mut target) {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "issue owns no regenerable probability or utility table",
            )
            .with_detail("issue_id", cmd.issue_id.to_string())
            .into());
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagram::{Decision, DecisionOption, Edge, Outcome, Uncertainty};
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

    #[tokio::test]
    async fn handler_rebuilds_the_probability_table() {
        let project_id = ProjectId::new();
        let parent = Issue::decision(
            project_id,
            "D",
            Decision::focus(vec![DecisionOption::new("x"), DecisionOption::new("y")]),
        );
        let target = Issue::uncertainty(
            project_id,
            "U",
            Uncertainty::key(vec![Outcome::new("a"), Outcome::new("b")]),
        );
        let target_id = target.id;
        let reader = StaticDiagramReader {
            edges: vec![Edge::new(project_id, parent.id, target.id)],
            issues: vec![parent, target],
        };

        let handler = RegenerateTablesHandler::new(Arc::new(reader));
        let regenerated = handler
            .handle(RegenerateTablesCommand {
                project_id,
                issue_id: target_id,
            })
            .await
            .unwrap();

        let table = &regenerated.uncertainty_payload().unwrap().probabilities;
        assert_eq!(table.len(), 4);
    }

    #[tokio::test]
    async fn unknown_issue_is_reported() {
        let reader = StaticDiagramReader {
            issues: vec![],
            edges: vec![],
        };
        let handler = RegenerateTablesHandler::new(Arc::new(reader));
        let err = handler
            .handle(RegenerateTablesCommand {
                project_id: ProjectId::new(),
                issue_id: IssueId::new(),
            })
            .await
            .unwrap_err();
        match err {
            EngineError::External(e) => assert_eq!(e.code, ErrorCode::IssueNotFound),
            other => panic!("expected external error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn issue_without_table_is_rejected() {
        let project_id = ProjectId::new();
        let fact = Issue::fact(project_id, "plain fact");
        let fact_id = fact.id;
        let reader = StaticDiagramReader {
            issues: vec![fact],
            edges: vec![],
        };

        let handler = RegenerateTablesHandler::new(Arc::new(reader));
        let err = handler
            .handle(RegenerateTablesCommand {
                project_id,
                issue_id: fact_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::External(_)));
    }
}
