//! UpdateSprint command

use super::add::check_dates;
use super::sprint_resource;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActorId, EntityKind, OrgId, SprintId};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Rename a sprint or change its goal and dates. Completed sprints are frozen.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSprint {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: SprintId,
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

operation!(
    UpdateSprint,
    verb = "update",
    noun = "sprint",
    description = "Update a sprint's name, goal or dates"
);

impl UpdateSprint {
    pub fn new(org: impl Into<OrgId>, actor: impl Into<ActorId>, id: impl Into<SprintId>) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
            name: None,
            goal: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UpdateSprint {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let sprint = ctx
            .db()
            .write(sprint_resource(&self.id), move |tx| {
                let mut sprint = store::get_sprint(tx, &cmd.org, &cmd.id)?;
                if sprint.status.is_frozen() {
                    return Err(TrackerError::conflict(
                        EntityKind::Sprint,
                        &sprint.id,
                        "completed sprints cannot be changed",
                    ));
                }

                if let Some(name) = cmd.name {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TrackerError::invalid_argument("name", "must not be empty"));
                    }
                    sprint.name = name.to_string();
                }
                if let Some(goal) = cmd.goal {
                    sprint.goal = Some(goal).filter(|g| !g.trim().is_empty());
                }
                sprint.start_date = cmd.start_date.or(sprint.start_date);
                sprint.end_date = cmd.end_date.or(sprint.end_date);
                check_dates(sprint.start_date, sprint.end_date)?;

                sprint.updated_at = Utc::now();
                store::update_sprint(tx, &sprint)?;
                Ok(sprint)
            })
            .await?;
        Ok(serde_json::to_value(&sprint)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::{AddSprint, CompleteSprint, StartSprint};
    use crate::test_support::{board, setup};
    use crate::types::Disposition;

    #[tokio::test]
    async fn test_rename_and_goal() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Sprint 1")
            .execute(&ctx)
            .await
            .unwrap();

        let updated = UpdateSprint::new("acme", "alice", sprint["id"].as_str().unwrap())
            .with_name("Sprint One")
            .with_goal("Billing")
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(updated["name"], "Sprint One");
        assert_eq!(updated["goal"], "Billing");
        assert_eq!(updated["status"], "planned");
    }

    #[tokio::test]
    async fn test_completed_sprint_is_frozen() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Sprint 1")
            .execute(&ctx)
            .await
            .unwrap();
        let id = sprint["id"].as_str().unwrap();
        StartSprint::new("acme", "alice", id).execute(&ctx).await.unwrap();
        CompleteSprint::new("acme", "alice", id, Disposition::Backlog)
            .execute(&ctx)
            .await
            .unwrap();

        let result = UpdateSprint::new("acme", "alice", id)
            .with_name("Renamed")
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::Conflict { .. })));
    }
}
