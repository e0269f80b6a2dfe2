//! Directed relevance arc between two issues.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EdgeId, IssueId, ProjectId};

/// A directed relevance arc, tail → head, scoped to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub project_id: ProjectId,
    pub tail_issue: IssueId,
    pub head_issue: IssueId,
}

impl Edge {
    /// Creates a new arc between two issues.
    pub fn new(project_id: ProjectId, tail_issue: IssueId, head_issue: IssueId) -> Self {
        Self {
            id: EdgeId::new(),
            project_id,
            tail_issue,
            head_issue,
        }
    }

    /// The (tail, head) pair identifying the connection.
    pub fn endpoints(&self) -> (IssueId, IssueId) {
        (self.tail_issue, self.head_issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_returns_tail_then_head() {
        let tail = IssueId::new();
        let head = IssueId::new();
        let edge = Edge::new(ProjectId::new(), tail, head);
        assert_eq!(edge.endpoints(), (tail, head));
    }
}
