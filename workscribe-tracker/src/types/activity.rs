//! Activity log entry types

use super::ids::{ActivityId, ActorId, OrgId, TaskId};
use super::project::EntityKind;
use super::sql::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    TaskCreated,
    FieldUpdated,
    TaskMoved,
    TasksReordered,
    CommentAdded,
    DocLinked,
    DocUnlinked,
    SprintCreated,
    SprintStarted,
    SprintCompleted,
    SprintDeleted,
}

text_enum!(ActivityAction {
    TaskCreated => "TASK_CREATED",
    FieldUpdated => "FIELD_UPDATED",
    TaskMoved => "TASK_MOVED",
    TasksReordered => "TASKS_REORDERED",
    CommentAdded => "COMMENT_ADDED",
    DocLinked => "DOC_LINKED",
    DocUnlinked => "DOC_UNLINKED",
    SprintCreated => "SPRINT_CREATED",
    SprintStarted => "SPRINT_STARTED",
    SprintCompleted => "SPRINT_COMPLETED",
    SprintDeleted => "SPRINT_DELETED",
});

/// An immutable audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: ActivityId,
    /// Store-assigned append order
    pub seq: i64,
    pub org_id: OrgId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub actor_id: ActorId,
    pub action: ActivityAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// An entry to append; ids, sequence and timestamp are assigned on write
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub org_id: OrgId,
    pub task_id: Option<TaskId>,
    pub actor_id: ActorId,
    pub action: ActivityAction,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl NewActivity {
    /// An entry about a task
    pub fn for_task(org_id: &OrgId, task_id: &TaskId, actor_id: &ActorId, action: ActivityAction) -> Self {
        Self {
            org_id: org_id.clone(),
            task_id: Some(task_id.clone()),
            actor_id: actor_id.clone(),
            action,
            entity_type: EntityKind::Task,
            entity_id: task_id.to_string(),
            old_value: None,
            new_value: None,
        }
    }

    /// A `FIELD_UPDATED` entry carrying `{field: old}` / `{field: new}`
    pub fn field_change(
        org_id: &OrgId,
        task_id: &TaskId,
        actor_id: &ActorId,
        field: &str,
        old: Value,
        new: Value,
    ) -> Self {
        Self::for_task(org_id, task_id, actor_id, ActivityAction::FieldUpdated)
            .with_old(serde_json::json!({ field: old }))
            .with_new(serde_json::json!({ field: new }))
    }

    /// An entry about some other entity (sprints, pages)
    pub fn for_entity(
        org_id: &OrgId,
        actor_id: &ActorId,
        action: ActivityAction,
        entity_type: EntityKind,
        entity_id: impl ToString,
    ) -> Self {
        Self {
            org_id: org_id.clone(),
            task_id: None,
            actor_id: actor_id.clone(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_old(mut self, value: Value) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn with_new(mut self, value: Value) -> Self {
        self.new_value = Some(value);
        self
    }
}
