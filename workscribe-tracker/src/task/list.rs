//! ListTasks command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store::{self, TaskFilter};
use crate::types::{OrgId, ProjectId, SprintId, StatusId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// List tasks of a project ordered by column, then position
#[derive(Debug, Clone, Deserialize)]
pub struct ListTasks {
    pub org: OrgId,
    pub project_id: ProjectId,
    pub status_id: Option<StatusId>,
    pub sprint_id: Option<SprintId>,
    /// Only tasks without a sprint
    #[serde(default)]
    pub backlog: bool,
}

operation!(
    ListTasks,
    verb = "list",
    noun = "tasks",
    description = "List tasks with optional status or sprint filter"
);

impl ListTasks {
    pub fn new(org: impl Into<OrgId>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            org: org.into(),
            project_id: project_id.into(),
            status_id: None,
            sprint_id: None,
            backlog: false,
        }
    }

    pub fn with_status(mut self, status_id: impl Into<StatusId>) -> Self {
        self.status_id = Some(status_id.into());
        self
    }

    pub fn with_sprint(mut self, sprint_id: impl Into<SprintId>) -> Self {
        self.sprint_id = Some(sprint_id.into());
        self
    }

    pub fn backlog(mut self) -> Self {
        self.backlog = true;
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListTasks {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        if self.backlog && self.sprint_id.is_some() {
            return Err(TrackerError::invalid_argument(
                "backlog",
                "cannot filter by sprint and backlog at once",
            ));
        }

        let cmd = self.clone();
        let tasks = ctx
            .db()
            .read(move |conn| {
                store::get_project(conn, &cmd.org, &cmd.project_id)?;
                let filter = TaskFilter {
                    status_id: cmd.status_id.clone(),
                    sprint_id: cmd.sprint_id.clone(),
                    backlog: cmd.backlog,
                };
                store::list_tasks(conn, &cmd.org, &cmd.project_id, &filter)
            })
            .await?;

        Ok(json!({ "tasks": tasks, "count": tasks.len() }))
    }
}
