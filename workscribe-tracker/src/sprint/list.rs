//! ListSprints command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{OrgId, ProjectId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// List a project's sprints with task counts
#[derive(Debug, Clone, Deserialize)]
pub struct ListSprints {
    pub org: OrgId,
    pub project_id: ProjectId,
}

operation!(
    ListSprints,
    verb = "list",
    noun = "sprints",
    description = "List sprints of a project with task counts"
);

impl ListSprints {
    pub fn new(org: impl Into<OrgId>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            org: org.into(),
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListSprints {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let sprints = ctx
            .db()
            .read(move |conn| {
                store::get_project(conn, &cmd.org, &cmd.project_id)?;
                store::list_sprint_summaries(conn, &cmd.org, &cmd.project_id)
            })
            .await?;
        Ok(json!({ "sprints": sprints, "count": sprints.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::AddSprint;
    use crate::task::{AddTask, MoveTask};
    use crate::test_support::{board, setup};

    #[tokio::test]
    async fn test_counts() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Sprint 1")
            .execute(&ctx)
            .await
            .unwrap();
        let sprint_id = sprint["id"].as_str().unwrap();
        for title in ["A", "B", "C"] {
            let task = AddTask::new("acme", "alice", b.project_id.as_str(), title)
                .in_sprint(sprint_id)
                .execute(&ctx)
                .await
                .unwrap();
            if title == "C" {
                MoveTask::new("acme", "alice", task["id"].as_str().unwrap(), 0)
                    .to_status(b.done.as_str())
                    .execute(&ctx)
                    .await
                    .unwrap();
            }
        }

        let result = ListSprints::new("acme", b.project_id.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["sprints"][0]["name"], "Sprint 1");
        assert_eq!(result["sprints"][0]["task_count"], 3);
        assert_eq!(result["sprints"][0]["completed_task_count"], 1);
    }
}
