//! Project read commands

use super::ProjectDetail;
use crate::context::TrackerContext;
use crate::counter;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{OrgId, ProjectId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Get a project with its columns and counter value
#[derive(Debug, Clone, Deserialize)]
pub struct GetProject {
    pub org: OrgId,
    pub id: ProjectId,
}

operation!(
    GetProject,
    verb = "get",
    noun = "project",
    description = "Get a project with its board columns"
);

impl GetProject {
    pub fn new(org: impl Into<OrgId>, id: impl Into<ProjectId>) -> Self {
        Self {
            org: org.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for GetProject {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let detail = ctx
            .db()
            .read(move |conn| {
                let project = store::get_project(conn, &cmd.org, &cmd.id)?;
                let statuses = store::list_statuses(conn, &project.id)?;
                let last_task_number = match counter::peek(conn, &project.id) {
                    Err(TrackerError::NotFound { .. }) => 0,
                    other => other?,
                };
                Ok(ProjectDetail {
                    project,
                    statuses,
                    last_task_number,
                })
            })
            .await?;
        Ok(serde_json::to_value(detail)?)
    }
}

/// List the projects of an organization
#[derive(Debug, Clone, Deserialize)]
pub struct ListProjects {
    pub org: OrgId,
}

operation!(
    ListProjects,
    verb = "list",
    noun = "projects",
    description = "List projects of an organization"
);

impl ListProjects {
    pub fn new(org: impl Into<OrgId>) -> Self {
        Self { org: org.into() }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListProjects {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let org = self.org.clone();
        let projects = ctx
            .db()
            .read(move |conn| store::list_projects(conn, &org))
            .await?;
        Ok(serde_json::json!({ "projects": projects, "count": projects.len() }))
    }
}
