//! GetTask command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{Comment, OrgId, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
struct TaskDetail {
    #[serde(flatten)]
    task: Task,
    status: TaskStatus,
    comments: Vec<Comment>,
}

/// Get a task with its status column and comments
#[derive(Debug, Clone, Deserialize)]
pub struct GetTask {
    pub org: OrgId,
    pub id: TaskId,
}

operation!(
    GetTask,
    verb = "get",
    noun = "task",
    description = "Get a task by ID"
);

impl GetTask {
    pub fn new(org: impl Into<OrgId>, id: impl Into<TaskId>) -> Self {
        Self {
            org: org.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetTask {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let detail = ctx
            .db()
            .read(move |conn| {
                let task = store::get_task(conn, &cmd.org, &cmd.id)?;
                let status = store::get_status(conn, &task.project_id, &task.status_id)?;
                let comments = store::list_comments(conn, &task.id)?;
                Ok(TaskDetail {
                    task,
                    status,
                    comments,
                })
            })
            .await?;
        Ok(serde_json::to_value(detail)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{add_task, board, setup};

    #[tokio::test]
    async fn test_get_task() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = add_task(&ctx, &b, "Write docs").await;

        let result = GetTask::new("acme", id.as_str()).execute(&ctx).await.unwrap();
        assert_eq!(result["title"], "Write docs");
        assert_eq!(result["status"]["name"], "To Do");
        assert_eq!(result["comments"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_get_task_from_other_org_is_not_found() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = add_task(&ctx, &b, "Secret").await;

        let result = GetTask::new("intruder", id.as_str()).execute(&ctx).await;
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }
}
