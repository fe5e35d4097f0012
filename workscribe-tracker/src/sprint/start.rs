//! StartSprint command

use super::{ensure_transition, sprint_resource};
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActivityAction, ActorId, EntityKind, NewActivity, OrgId, SprintId, SprintStatus};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

/// Move a planned sprint to active
#[derive(Debug, Clone, Deserialize)]
pub struct StartSprint {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: SprintId,
}

operation!(
    StartSprint,
    verb = "start",
    noun = "sprint",
    description = "Start a planned sprint"
);

impl StartSprint {
    pub fn new(org: impl Into<OrgId>, actor: impl Into<ActorId>, id: impl Into<SprintId>) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for StartSprint {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let sprint = ctx
            .db()
            .write(sprint_resource(&self.id), move |tx| {
                let mut sprint = store::get_sprint(tx, &cmd.org, &cmd.id)?;
                ensure_transition(&sprint, SprintStatus::Active)?;

                if let Some(active) = store::active_sprint(tx, &sprint.project_id)? {
                    return Err(TrackerError::conflict(
                        EntityKind::Sprint,
                        &sprint.id,
                        format!("sprint {} is already active in this project", active.id),
                    ));
                }

                let now = Utc::now();
                store::set_sprint_status(tx, &sprint, SprintStatus::Active, now)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_entity(
                        &cmd.org,
                        &cmd.actor,
                        ActivityAction::SprintStarted,
                        EntityKind::Sprint,
                        &sprint.id,
                    )
                    .with_old(json!({ "status": sprint.status }))
                    .with_new(json!({ "status": SprintStatus::Active })),
                )?;
                sprint.status = SprintStatus::Active;
                sprint.updated_at = now;
                Ok(sprint)
            })
            .await?;

        info!(sprint = %sprint.id, project = %sprint.project_id, "sprint started");
        Ok(serde_json::to_value(&sprint)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::AddSprint;
    use crate::test_support::{board, setup};

    async fn planned(ctx: &TrackerContext, project: &str, name: &str) -> String {
        let sprint = AddSprint::new("acme", "alice", project, name)
            .execute(ctx)
            .await
            .unwrap();
        sprint["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_start_planned_sprint() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = planned(&ctx, &b.project_id, "Sprint 1").await;

        let started = StartSprint::new("acme", "alice", id.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(started["status"], "active");
    }

    #[tokio::test]
    async fn test_second_active_sprint_conflicts() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let first = planned(&ctx, &b.project_id, "Sprint 1").await;
        let second = planned(&ctx, &b.project_id, "Sprint 2").await;

        StartSprint::new("acme", "alice", first.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        let result = StartSprint::new("acme", "alice", second.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_restart_conflicts() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = planned(&ctx, &b.project_id, "Sprint 1").await;

        StartSprint::new("acme", "alice", id.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        let again = StartSprint::new("acme", "alice", id.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(again, Err(TrackerError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_other_org_cannot_start() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let id = planned(&ctx, &b.project_id, "Sprint 1").await;

        let result = StartSprint::new("globex", "eve", id.as_str())
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }
}
