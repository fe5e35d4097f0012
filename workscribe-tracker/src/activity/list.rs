//! ListActivity command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store::{self, ActivityScope};
use crate::types::{EntityKind, OrgId, SprintId, TaskId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Read the activity of a task or a sprint, newest first
#[derive(Debug, Clone, Deserialize)]
pub struct ListActivity {
    pub org: OrgId,
    pub task_id: Option<TaskId>,
    pub sprint_id: Option<SprintId>,
    /// Maximum number of entries; all when absent
    pub limit: Option<usize>,
}

operation!(
    ListActivity,
    verb = "list",
    noun = "activity",
    description = "List activity entries for a task or sprint, newest first"
);

impl ListActivity {
    pub fn for_task(org: impl Into<OrgId>, task_id: impl Into<TaskId>) -> Self {
        Self {
            org: org.into(),
            task_id: Some(task_id.into()),
            sprint_id: None,
            limit: None,
        }
    }

    pub fn for_sprint(org: impl Into<OrgId>, sprint_id: impl Into<SprintId>) -> Self {
        Self {
            org: org.into(),
            task_id: None,
            sprint_id: Some(sprint_id.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListActivity {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let entries = ctx
            .db()
            .read(move |conn| match (&cmd.task_id, &cmd.sprint_id) {
                (Some(task_id), None) => {
                    // History outlives the task, but a foreign tenant sees nothing
                    let any_visible: bool = conn.query_row(
                        "SELECT EXISTS(SELECT 1 FROM activity_log WHERE task_id = ?1 AND org_id = ?2)",
                        rusqlite::params![task_id, cmd.org],
                        |row| row.get(0),
                    )?;
                    if !any_visible {
                        store::get_task(conn, &cmd.org, task_id)?;
                    }
                    store::list_activity(conn, &cmd.org, ActivityScope::Task(task_id), cmd.limit)
                }
                (None, Some(sprint_id)) => store::list_activity(
                    conn,
                    &cmd.org,
                    ActivityScope::Entity(EntityKind::Sprint, sprint_id.as_str()),
                    cmd.limit,
                ),
                _ => Err(TrackerError::invalid_argument(
                    "task_id",
                    "exactly one of task_id or sprint_id is required",
                )),
            })
            .await?;
        Ok(serde_json::to_value(entries)?)
    }
}
