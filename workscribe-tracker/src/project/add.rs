//! AddProject command

use super::ProjectDetail;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{OrgId, Project, ProjectId, StatusId, TaskStatus, DEFAULT_STATUSES};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

const MAX_KEY_LEN: usize = 10;

/// Create a project with its task counter and default board columns
#[derive(Debug, Clone, Deserialize)]
pub struct AddProject {
    pub org: OrgId,
    /// Short uppercase key used in task keys, e.g. `WS`
    pub key: String,
    pub name: String,
}

operation!(
    AddProject,
    verb = "add",
    noun = "project",
    description = "Create a project with default board columns"
);

impl AddProject {
    pub fn new(org: impl Into<OrgId>, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            key: key.into(),
            name: name.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        let key_ok = !self.key.is_empty()
            && self.key.len() <= MAX_KEY_LEN
            && self.key.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            && self
                .key
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !key_ok {
            return Err(TrackerError::invalid_argument(
                "key",
                format!(
                    "'{}' must be 1-{} uppercase letters or digits starting with a letter",
                    self.key, MAX_KEY_LEN
                ),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(TrackerError::invalid_argument("name", "must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddProject {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        self.validate()?;

        let project = Project {
            id: ProjectId::new(),
            org_id: self.org.clone(),
            key: self.key.clone(),
            name: self.name.trim().to_string(),
            created_at: Utc::now(),
        };

        let detail = ctx
            .db()
            .write(format!("org {}", self.org), move |tx| {
                store::insert_project(tx, &project)?;
                let mut statuses = Vec::with_capacity(DEFAULT_STATUSES.len());
                for (order, (name, category)) in DEFAULT_STATUSES.iter().enumerate() {
                    let status = TaskStatus {
                        id: StatusId::new(),
                        project_id: project.id.clone(),
                        name: name.to_string(),
                        category: *category,
                        order: order as i64,
                    };
                    store::insert_status(tx, &status)?;
                    statuses.push(status);
                }
                Ok(ProjectDetail {
                    project,
                    statuses,
                    last_task_number: 0,
                })
            })
            .await?;

        info!(project = %detail.project.id, key = %detail.project.key, "project created");
        Ok(serde_json::to_value(detail)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_add_project_creates_default_columns() {
        let (_temp, ctx) = setup();
        let result = AddProject::new("acme", "WS", "Workscribe")
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(result["key"], "WS");
        let statuses = result["statuses"].as_array().unwrap();
        let names: Vec<&str> = statuses.iter().map(|s| s["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["To Do", "In Progress", "Done"]);
        assert_eq!(statuses[2]["category"], "done");
        assert_eq!(result["last_task_number"], 0);
    }

    #[tokio::test]
    async fn test_duplicate_key_conflicts() {
        let (_temp, ctx) = setup();
        AddProject::new("acme", "WS", "One").execute(&ctx).await.unwrap();
        let result = AddProject::new("acme", "WS", "Two").execute(&ctx).await;
        assert!(matches!(result, Err(TrackerError::Conflict { .. })));

        // keys are unique per organization only
        assert!(AddProject::new("other", "WS", "Three").execute(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let (_temp, ctx) = setup();
        for key in ["", "ws", "1WS", "WAYTOOLONGKEY"] {
            let result = AddProject::new("acme", key, "Name").execute(&ctx).await;
            assert!(
                matches!(result, Err(TrackerError::InvalidArgument { .. })),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
