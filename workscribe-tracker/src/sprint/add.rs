//! AddSprint command

use crate::activity;
use crate::context::TrackerContext;
use crate::counter::project_resource;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{
    ActivityAction, ActorId, EntityKind, NewActivity, OrgId, ProjectId, Sprint, SprintId,
    SprintStatus,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// Create a planned sprint
#[derive(Debug, Clone, Deserialize)]
pub struct AddSprint {
    pub org: OrgId,
    pub actor: ActorId,
    pub project_id: ProjectId,
    pub name: String,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

operation!(
    AddSprint,
    verb = "add",
    noun = "sprint",
    description = "Create a planned sprint in a project"
);

impl AddSprint {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        project_id: impl Into<ProjectId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            project_id: project_id.into(),
            name: name.into(),
            goal: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

/// `InvalidArgument` when both dates are set and end precedes start
pub(super) fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(TrackerError::invalid_argument(
            "end_date",
            "must not be before start_date",
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddSprint {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(TrackerError::invalid_argument("name", "must not be empty"));
        }
        check_dates(self.start_date, self.end_date)?;

        let cmd = self.clone();
        let sprint = ctx
            .db()
            .write(project_resource(&self.project_id), move |tx| {
                let project = store::get_project(tx, &cmd.org, &cmd.project_id)?;
                let now = Utc::now();
                let sprint = Sprint {
                    id: SprintId::new(),
                    org_id: cmd.org.clone(),
                    project_id: project.id,
                    name,
                    goal: cmd.goal.clone(),
                    status: SprintStatus::Planned,
                    start_date: cmd.start_date,
                    end_date: cmd.end_date,
                    created_at: now,
                    updated_at: now,
                };
                store::insert_sprint(tx, &sprint)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_entity(
                        &cmd.org,
                        &cmd.actor,
                        ActivityAction::SprintCreated,
                        EntityKind::Sprint,
                        &sprint.id,
                    )
                    .with_new(json!({ "name": sprint.name, "status": sprint.status })),
                )?;
                Ok(sprint)
            })
            .await?;
        Ok(serde_json::to_value(&sprint)?)
    }
}
