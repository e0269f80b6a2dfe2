//! ComputePartialOrderHandler - derives the evaluation ordering of a
//! diagram.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::foundation::ProjectId;
use crate::domain::ordering::{PartialOrder, PartialOrderCalculator};
use crate::domain::validation::DiagramValidator;
use crate::ports::DiagramReader;

use super::super::EngineError;

/// Command to compute the partial order for a project's diagram.
#[derive(Debug, Clone)]
pub struct ComputePartialOrderCommand {
    pub project_id: ProjectId,
}

/// Handler computing partial orders.
pub struct ComputePartialOrderHandler {
    reader: Arc<dyn DiagramReader>,
    config: EngineConfig,
}

impl ComputePartialOrderHandler {
    pub fn new(reader: Arc<dyn DiagramReader>, config: EngineConfig) -> Self {
        Self { reader, config }
    }

    pub async fn handle(
        &self,
        cmd: ComputePartialOrderCommand,
    ) -> Result<PartialOrder, EngineError> {
        // 1. Load the diagram, in display order so results are stable
        //    regardless of storage order
        let (mut issues, edges) = self.reader.influence_diagram(cmd.project_id).await?;
        issues.sort_by_key(|issue| (issue.order, issue.id));

        // 2. Validate and order on a worker thread
        let config = self.config.clone();
        let order = tokio::task::spawn_blocking(move || -> Result<PartialOrder, EngineError> {
            let mut validator = DiagramValidator::new(&config);
            let validated = validator.validate(issues, edges)?;
            let calculator = PartialOrderCalculator::new(&validated.issues, &validated.edges);
            Ok(calculator.partial_order())
        })
        .await
        .map_err(|e| EngineError::Worker(e.to_string()))??;

        Ok(order)
    }
}
