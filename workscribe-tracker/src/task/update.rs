//! UpdateTask command

use super::task_resource;
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::notification::{assignment_notice, done_notice, Notifier};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{
    ActorId, EntityKind, NewActivity, OrgId, SprintId, StatusId, TaskId, TaskPriority, TaskType,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Update task fields. Absent fields are left untouched; `null` clears
/// clearable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: TaskId,
    pub title: Option<String>,
    pub priority: Option<TaskPriority>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee: Option<Option<ActorId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sprint_id: Option<Option<SprintId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    /// New column; the task goes to the end of it
    pub status_id: Option<StatusId>,
}

operation!(
    UpdateTask,
    verb = "update",
    noun = "task",
    description = "Update task fields"
);

impl UpdateTask {
    pub fn new(org: impl Into<OrgId>, actor: impl Into<ActorId>, id: impl Into<TaskId>) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn assign(mut self, assignee: impl Into<ActorId>) -> Self {
        self.assignee = Some(Some(assignee.into()));
        self
    }

    pub fn unassign(mut self) -> Self {
        self.assignee = Some(None);
        self
    }

    pub fn with_sprint(mut self, sprint_id: impl Into<SprintId>) -> Self {
        self.sprint_id = Some(Some(sprint_id.into()));
        self
    }

    pub fn to_backlog(mut self) -> Self {
        self.sprint_id = Some(None);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    pub fn with_status(mut self, status_id: impl Into<StatusId>) -> Self {
        self.status_id = Some(status_id.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateTask {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let rules = ctx.ordering();
        let (task, notifications) = ctx
            .db()
            .write(task_resource(&self.id), move |tx| {
                let mut task = store::get_task(tx, &cmd.org, &cmd.id)?;
                let mut changes: Vec<NewActivity> = Vec::new();
                let mut change = |field: &str, old: Value, new: Value| {
                    changes.push(NewActivity::field_change(
                        &cmd.org, &cmd.id, &cmd.actor, field, old, new,
                    ));
                };

                if let Some(title) = &cmd.title {
                    let title = title.trim();
                    if title.is_empty() {
                        return Err(TrackerError::invalid_argument("title", "must not be empty"));
                    }
                    if title != task.title {
                        change("title", json!(task.title), json!(title));
                        task.title = title.to_string();
                    }
                }

                if let Some(priority) = cmd.priority.filter(|p| *p != task.priority) {
                    change("priority", json!(task.priority), json!(priority));
                    task.priority = priority;
                }

                if let Some(task_type) = cmd.task_type.filter(|t| *t != task.task_type) {
                    change("type", json!(task.task_type), json!(task_type));
                    task.task_type = task_type;
                }

                let mut assigned = false;
                if let Some(assignee) = cmd.assignee.clone().filter(|a| *a != task.assignee_id) {
                    change("assignee_id", json!(task.assignee_id), json!(assignee));
                    assigned = assignee.is_some();
                    task.assignee_id = assignee;
                }

                if let Some(sprint_id) = cmd.sprint_id.clone().filter(|s| *s != task.sprint_id) {
                    if let Some(id) = &sprint_id {
                        let sprint = store::get_sprint(tx, &cmd.org, id)?;
                        if sprint.project_id != task.project_id {
                            return Err(TrackerError::invalid_argument(
                                "sprint_id",
                                "sprint belongs to another project",
                            ));
                        }
                        if sprint.status.is_frozen() {
                            return Err(TrackerError::conflict(
                                EntityKind::Sprint,
                                id,
                                "sprint is completed",
                            ));
                        }
                    }
                    change("sprint_id", json!(task.sprint_id), json!(sprint_id));
                    task.sprint_id = sprint_id;
                }

                if let Some(due_date) = cmd.due_date.filter(|d| *d != task.due_date) {
                    change("due_date", json!(task.due_date), json!(due_date));
                    task.due_date = due_date;
                }

                let mut finished = false;
                if let Some(status_id) = cmd.status_id.as_ref().filter(|s| **s != task.status_id) {
                    let from = store::get_status(tx, &task.project_id, &task.status_id)?;
                    let to = store::get_status(tx, &task.project_id, status_id)?;
                    let column = store::column_positions(tx, &to.id, Some(&task.id))?;
                    change("status_id", json!(from.id), json!(to.id));
                    finished = to.is_done() && !from.is_done();
                    let placement = rules.append(&column);
                    for (sibling, position) in &placement.rebalanced {
                        store::set_task_position(tx, sibling, *position, Utc::now())?;
                    }
                    task.status_id = to.id;
                    task.position = placement.position;
                }

                if changes.is_empty() {
                    return Ok((task, Vec::new()));
                }

                task.updated_at = Utc::now();
                store::update_task(tx, &task)?;
                activity::log_all(tx, changes)?;

                let mut notices = Vec::new();
                if assigned {
                    notices.extend(assignment_notice(&task, &cmd.actor));
                }
                if finished {
                    notices.extend(done_notice(&task, &cmd.actor));
                }
                let notifications = Notifier::record_all(tx, notices)?;
                Ok((task, notifications))
            })
            .await?;

        ctx.notifier().push_all(&notifications);
        Ok(serde_json::to_value(&task)?)
    }
}
