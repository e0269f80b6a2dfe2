//! Diagram reader port.
//!
//! The engine consumes a flat set of issue view objects (with resolved
//! payloads and nested option/outcome/table rows) and a flat set of edge
//! view objects per diagram scope. Persistence is an adapter concern.

use async_trait::async_trait;

use crate::domain::diagram::{Edge, Issue};
use crate::domain::foundation::{DomainError, ProjectId};

/// Read port for influence diagram data.
#[async_trait]
pub trait DiagramReader: Send + Sync {
    /// Loads the full issue and edge sets for a project scope.
    ///
    /// # Errors
    ///
    /// - `ProjectNotFound` if the scope does not exist
    /// - `StorageError` on retrieval failure
    async fn influence_diagram(
        &self,
        project_id: ProjectId,
    ) -> Result<(Vec<Issue>, Vec<Edge>), DomainError>;
}
