//! DeleteSprint command

use super::sprint_resource;
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActivityAction, ActorId, EntityKind, NewActivity, OrgId, SprintId};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Delete a planned sprint. Its tasks return to the backlog.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteSprint {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: SprintId,
}

operation!(
    DeleteSprint,
    verb = "delete",
    noun = "sprint",
    description = "Delete a planned sprint"
);

impl DeleteSprint {
    pub fn new(org: impl Into<OrgId>, actor: impl Into<ActorId>, id: impl Into<SprintId>) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for DeleteSprint {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let released = ctx
            .db()
            .write(sprint_resource(&self.id), move |tx| {
                let sprint = store::get_sprint(tx, &cmd.org, &cmd.id)?;
                if !sprint.status.is_deletable() {
                    return Err(TrackerError::conflict(
                        EntityKind::Sprint,
                        &sprint.id,
                        format!("cannot delete a {} sprint", sprint.status),
                    ));
                }

                let now = Utc::now();
                let released = store::tasks_in_sprint(tx, &sprint.id)?;
                for task_id in &released {
                    store::set_task_sprint(tx, task_id, None, now)?;
                    activity::log_activity(
                        tx,
                        NewActivity::field_change(
                            &cmd.org,
                            task_id,
                            &cmd.actor,
                            "sprint_id",
                            json!(sprint.id),
                            Value::Null,
                        ),
                    )?;
                }

                store::delete_sprint(tx, &sprint.id)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_entity(
                        &cmd.org,
                        &cmd.actor,
                        ActivityAction::SprintDeleted,
                        EntityKind::Sprint,
                        &sprint.id,
                    )
                    .with_old(json!({ "name": sprint.name, "status": sprint.status })),
                )?;
                Ok(released)
            })
            .await?;

        info!(sprint = %self.id, released = released.len(), "sprint deleted");
        Ok(json!({ "deleted": true, "id": self.id, "released_tasks": released }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ListActivity;
    use crate::sprint::{AddSprint, StartSprint};
    use crate::task::{AddTask, GetTask};
    use crate::test_support::{board, setup};

    #[tokio::test]
    async fn test_delete_planned_sprint_releases_tasks() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Sprint 1")
            .execute(&ctx)
            .await
            .unwrap();
        let sprint_id = sprint["id"].as_str().unwrap();
        let task = AddTask::new("acme", "alice", b.project_id.as_str(), "Queued")
            .in_sprint(sprint_id)
            .execute(&ctx)
            .await
            .unwrap();
        let task_id = task["id"].as_str().unwrap();

        let result = DeleteSprint::new("acme", "alice", sprint_id)
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["released_tasks"].as_array().unwrap().len(), 1);

        let task = GetTask::new("acme", task_id).execute(&ctx).await.unwrap();
        assert!(task.get("sprint_id").is_none());

        let log = ListActivity::for_task("acme", task_id).execute(&ctx).await.unwrap();
        assert_eq!(log[0]["action"], "FIELD_UPDATED");
        assert_eq!(log[0]["old_value"]["sprint_id"], sprint_id);

        let history = ListActivity::for_sprint("acme", sprint_id).execute(&ctx).await.unwrap();
        assert_eq!(history[0]["action"], "SPRINT_DELETED");
    }

    #[tokio::test]
    async fn test_delete_empty_planned_sprint() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Empty")
            .execute(&ctx)
            .await
            .unwrap();

        let result = DeleteSprint::new("acme", "alice", sprint["id"].as_str().unwrap())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["released_tasks"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_active_sprint_cannot_be_deleted() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Running")
            .execute(&ctx)
            .await
            .unwrap();
        let id = sprint["id"].as_str().unwrap();
        StartSprint::new("acme", "alice", id).execute(&ctx).await.unwrap();

        let result = DeleteSprint::new("acme", "alice", id).execute(&ctx).await;
        assert!(matches!(result, Err(TrackerError::Conflict { .. })));
    }
}
