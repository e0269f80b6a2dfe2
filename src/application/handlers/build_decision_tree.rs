//! BuildDecisionTreeHandler - materializes the full decision tree for a
//! diagram.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::foundation::ProjectId;
use crate::domain::ordering::PartialOrderCalculator;
use crate::domain::tree::{DecisionTree, DecisionTreeBuilder};
use crate::domain::validation::DiagramValidator;
use crate::ports::DiagramReader;

use super::super::EngineError;

/// Command to materialize the decision tree for a project's diagram.
#[derive(Debug, Clone)]
pub struct BuildDecisionTreeCommand {
    pub project_id: ProjectId,
}

/// Handler materializing decision trees.
pub struct BuildDecisionTreeHandler {
    reader: Arc<dyn DiagramReader>,
    config: EngineConfig,
}

impl BuildDecisionTreeHandler {
    pub fn new(reader: Arc<dyn DiagramReader>, config: EngineConfig) -> Self {
        Self { reader, config }
    }

    pub async fn handle(
        &self,
        cmd: BuildDecisionTreeCommand,
    ) -> Result<DecisionTree, EngineError> {
        // 1. Load the diagram, in display order so results are stable
        //    regardless of storage order
        let (mut issues, edges) = self.reader.influence_diagram(cmd.project_id).await?;
        issues.sort_by_key(|issue| (issue.order, issue.id));

        // 2. Validate, order and expand on a worker thread; expansion is
        //    the CPU-heavy step and must not stall the host.
        let config = self.config.clone();
        let tree = tokio::task::spawn_blocking(move || -> Result<DecisionTree, EngineError> {
            let mut validator = DiagramValidator::new(&config);
            let validated = validator.validate(issues, edges)?;
            let order =
                PartialOrderCalculator::new(&validated.issues, &validated.edges).partial_order();
            let builder = DecisionTreeBuilder::new(&validated.issues, &config);
            Ok(builder.build(&order)?)
        })
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))??;

        Ok(tree)
    }
}
