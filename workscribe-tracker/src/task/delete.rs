//! DeleteTask command

use super::task_resource;
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActorId, EntityKind, NewActivity, OrgId, TaskId};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Delete a task. Only its reporter or an admin may do so; subtasks are
/// detached rather than deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTask {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: TaskId,
    #[serde(default)]
    pub admin: bool,
}

operation!(
    DeleteTask,
    verb = "delete",
    noun = "task",
    description = "Delete a task"
);

impl DeleteTask {
    pub fn new(org: impl Into<OrgId>, actor: impl Into<ActorId>, id: impl Into<TaskId>) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
            admin: false,
        }
    }

    pub fn as_admin(mut self) -> Self {
        self.admin = true;
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for DeleteTask {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let (task, detached) = ctx
            .db()
            .write(task_resource(&self.id), move |tx| {
                let task = store::get_task(tx, &cmd.org, &cmd.id)?;
                if task.reporter_id != cmd.actor && !cmd.admin {
                    return Err(TrackerError::conflict(
                        EntityKind::Task,
                        &task.id,
                        "only the reporter or an admin may delete this task",
                    ));
                }
                let detached = store::detach_subtasks(tx, &task.id, Utc::now())?;
                activity::log_all(
                    tx,
                    detached.iter().map(|subtask| {
                        NewActivity::field_change(
                            &cmd.org,
                            subtask,
                            &cmd.actor,
                            "parent_task_id",
                            json!(task.id),
                            Value::Null,
                        )
                    }),
                )?;
                store::delete_task(tx, &task.id)?;
                Ok((task, detached.len()))
            })
            .await?;

        info!(task = %task.id, key = %task.key, actor = %self.actor, detached, "task deleted");
        Ok(json!({
            "deleted": true,
            "id": task.id,
            "key": task.key,
            "detached_subtasks": detached,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ListActivity;
    use crate::task::{AddTask, GetTask};
    use crate::test_support::{add_task, board, setup};

    #[tokio::test]
    async fn test_reporter_can_delete() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = add_task(&ctx, &b, "Temp").await;

        let result = DeleteTask::new("acme", "alice", id.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["deleted"], true);

        let gone = GetTask::new("acme", id.as_str()).execute(&ctx).await;
        assert!(matches!(gone, Err(TrackerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_others_need_admin() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = add_task(&ctx, &b, "Keep").await;

        let denied = DeleteTask::new("acme", "mallory", id.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(denied, Err(TrackerError::Conflict { .. })));

        DeleteTask::new("acme", "root", id.as_str())
            .as_admin()
            .execute(&ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_subtasks_are_detached() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let parent = add_task(&ctx, &b, "Epic").await;
        let child = AddTask::new("acme", "alice", b.project_id.as_str(), "Piece")
            .with_parent(parent.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        let child_id = child["id"].as_str().unwrap();

        let result = DeleteTask::new("acme", "alice", parent.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["detached_subtasks"], 1);

        let child = GetTask::new("acme", child_id).execute(&ctx).await.unwrap();
        assert!(child.get("parent_task_id").is_none());
    }

    #[tokio::test]
    async fn test_detached_subtask_history_records_parent_change() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let parent = add_task(&ctx, &b, "Epic").await;
        let child = AddTask::new("acme", "alice", b.project_id.as_str(), "Piece")
            .with_parent(parent.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        let history = ListActivity::for_task("acme", child["id"].as_str().unwrap());

        let before = history.execute(&ctx).await.unwrap().as_array().unwrap().len();
        DeleteTask::new("acme", "alice", parent.as_str())
            .execute(&ctx)
            .await
            .unwrap();

        let log = history.execute(&ctx).await.unwrap();
        let log = log.as_array().unwrap();
        assert_eq!(log.len(), before + 1);
        assert_eq!(log[0]["action"], "FIELD_UPDATED");
        assert_eq!(log[0]["actor_id"], "alice");
        assert_eq!(log[0]["old_value"]["parent_task_id"], parent.as_str());
        assert!(log[0]["new_value"]["parent_task_id"].is_null());
    }
}
