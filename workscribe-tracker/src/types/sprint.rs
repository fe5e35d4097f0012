//! Sprint lifecycle types

use super::ids::{OrgId, ProjectId, SprintId};
use super::sql::text_enum;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a sprint. Transitions only move forward:
/// `planned -> active -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

text_enum!(SprintStatus {
    Planned => "planned",
    Active => "active",
    Completed => "completed",
});

impl SprintStatus {
    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: SprintStatus) -> bool {
        matches!(
            (self, next),
            (SprintStatus::Planned, SprintStatus::Active)
                | (SprintStatus::Active, SprintStatus::Completed)
        )
    }

    /// Only planned sprints may be deleted
    pub fn is_deletable(self) -> bool {
        self == SprintStatus::Planned
    }

    /// Completed sprints accept no further changes, including new tasks
    pub fn is_frozen(self) -> bool {
        self == SprintStatus::Completed
    }
}

/// A time-boxed grouping of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub org_id: OrgId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub status: SprintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sprint with task counts, as returned by listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintSummary {
    #[serde(flatten)]
    pub sprint: Sprint,
    pub task_count: i64,
    pub completed_task_count: i64,
}

/// Where incomplete tasks go when a sprint completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Disposition {
    /// Clear the sprint association
    Backlog,
    /// Reassign to another planned sprint of the same project
    Sprint { target: SprintId },
}

impl Disposition {
    pub fn to_sprint(target: impl Into<SprintId>) -> Self {
        Self::Sprint {
            target: target.into(),
        }
    }

    /// Destination sprint for incomplete tasks, `None` for the backlog
    pub fn destination(&self) -> Option<&SprintId> {
        match self {
            Disposition::Backlog => None,
            Disposition::Sprint { target } => Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        use SprintStatus::*;
        assert!(Planned.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Planned.can_transition_to(Completed));
        assert!(!Active.can_transition_to(Planned));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_only_planned_is_deletable() {
        assert!(SprintStatus::Planned.is_deletable());
        assert!(!SprintStatus::Active.is_deletable());
        assert!(!SprintStatus::Completed.is_deletable());
    }

    #[test]
    fn test_disposition_wire_format() {
        let backlog: Disposition = serde_json::from_str(r#"{"action":"backlog"}"#).unwrap();
        assert_eq!(backlog, Disposition::Backlog);

        let moved: Disposition =
            serde_json::from_str(r#"{"action":"sprint","target":"S2"}"#).unwrap();
        assert_eq!(moved.destination(), Some(&SprintId::from("S2")));
    }
}
