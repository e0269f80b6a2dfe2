//! Issue - a node in the influence diagram.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Boundary, IssueId, IssueKind, ProjectId, Timestamp};

use super::{Decision, Uncertainty, Utility};

/// The kind-specific payload owned by an issue.
///
/// At most one payload exists per issue, mutually exclusive by kind;
/// `Fact` and `Unassigned` issues carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IssuePayload {
    Decision(Decision),
    Uncertainty(Uncertainty),
    Utility(Utility),
}

/// A node in the influence diagram.
///
/// Issues are long-lived entities mutated by the surrounding modeling
/// workflow; deleting an issue cascades to its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    kind: IssueKind,
    pub boundary: Boundary,
    pub name: String,
    /// Display order within the diagram.
    pub order: i32,
    payload: Option<IssuePayload>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Issue {
    fn new(project_id: ProjectId, name: impl Into<String>, kind: IssueKind,
           payload: Option<IssuePayload>) -> Self {
        let now = Timestamp::now();
        Self {
            id: IssueId::new(),
            project_id,
            kind,
            boundary: Boundary::In,
            name: name.into(),
            order: 0,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a decision issue owning the given payload.
    pub fn decision(project_id: ProjectId, name: impl Into<String>, decision: Decision) -> Self {
        Self::new(
            project_id,
            name,
            IssueKind::Decision,
            Some(IssuePayload::Decision(decision)),
        )
    }

    /// Creates an uncertainty issue owning the given payload.
    pub fn uncertainty(
        project_id: ProjectId,
        name: impl Into<String>,
        uncertainty: Uncertainty,
    ) -> Self {
        Self::new(
            project_id,
            name,
            IssueKind::Uncertainty,
            Some(IssuePayload::Uncertainty(uncertainty)),
        )
    }

    /// Creates a utility issue owning the given payload.
    pub fn utility(project_id: ProjectId, name: impl Into<String>, utility: Utility) -> Self {
        Self::new(
            project_id,
            name,
            IssueKind::Utility,
            Some(IssuePayload::Utility(utility)),
        )
    }

    /// Creates a fact issue (no payload).
    pub fn fact(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self::new(project_id, name, IssueKind::Fact, None)
    }

    /// Creates an unassigned issue (no payload).
    pub fn unassigned(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self::new(project_id, name, IssueKind::Unassigned, None)
    }

    /// Sets the analysis boundary.
    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the display order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// The issue kind; always consistent with the owned payload.
    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    /// The decision payload, if this is a decision issue.
    pub fn decision_payload(&self) -> Option<&Decision> {
        match &self.payload {
            Some(IssuePayload::Decision(d)) => Some(d),
            _ => None,
        }
    }

    /// Mutable access to the decision payload.
    pub fn decision_payload_mut(&mut self) -> Option<&mut Decision> {
        match &mut self.payload {
            Some(IssuePayload::Decision(d)) => Some(d),
            _ => None,
        }
    }

    /// The uncertainty payload, if this is an uncertainty issue.
    pub fn uncertainty_payload(&self) -> Option<&Uncertainty> {
        match &self.payload {
            Some(IssuePayload::Uncertainty(u)) => Some(u),
            _ => None,
        }
    }

    /// Mutable access to the uncertainty payload.
    pub fn uncertainty_payload_mut(&mut self) -> Option<&mut Uncertainty> {
        match &mut self.payload {
            Some(IssuePayload::Uncertainty(u)) => Some(u),
            _ => None,
        }
    }

    /// The utility payload, if this is a utility issue.
    pub fn utility_payload(&self) -> Option<&Utility> {
        match &self.payload {
            Some(IssuePayload::Utility(u)) => Some(u),
            _ => None,
        }
    }

    /// Mutable access to the utility payload.
    pub fn utility_payload_mut(&mut self) -> Option<&mut Utility> {
        match &mut self.payload {
            Some(IssuePayload::Utility(u)) => Some(u),
            _ => None,
        }
    }

    /// Replaces the payload, keeping the kind consistent.
    ///
    /// Used by the table regeneration workflow, which rewrites the
    /// probability/utility rows of an existing payload.
    pub fn replace_payload(&mut self, payload: IssuePayload) {
        self.kind = match &payload {
            IssuePayload::Decision(_) => IssueKind::Decision,
            IssuePayload::Uncertainty(_) => IssueKind::Uncertainty,
            IssuePayload::Utility(_) => IssueKind::Utility,
        };
        self.payload = Some(payload);
        self.updated_at = Timestamp::now();
    }
}
