//! Per-project task number allocation
//!
//! The counter row is incremented in place under the write lock. Numbers are
//! strictly increasing in commit order; a rolled-back transaction may leave a
//! gap but two callers never see the same number.

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{EntityKind, OrgId, ProjectId};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Lock resource label for a project's counter and board
pub(crate) fn project_resource(project_id: &ProjectId) -> String {
    format!("project {}", project_id)
}

/// Issue the next task number for `project_id`.
///
/// Must run inside a write transaction.
pub fn allocate_next(conn: &Connection, org: &OrgId, project_id: &ProjectId) -> Result<i64> {
    store::get_project(conn, org, project_id)?;

    let next: Option<i64> = conn
        .query_row(
            "UPDATE project_counters SET last_number = last_number + 1 \
             WHERE project_id = ?1 RETURNING last_number",
            params![project_id],
            |row| row.get(0),
        )
        .optional()?;

    let number = match next {
        Some(n) => n,
        None => {
            // Project predates its counter row
            conn.query_row(
                "INSERT INTO project_counters (project_id, last_number) VALUES (?1, 1) \
                 RETURNING last_number",
                params![project_id],
                |row| row.get(0),
            )?
        }
    };

    debug!(project = %project_id, number, "allocated task number");
    Ok(number)
}

/// Allocate the next task number of a project
#[derive(Debug, Clone, Deserialize)]
pub struct AllocateTaskNumber {
    pub org: OrgId,
    pub project_id: ProjectId,
}

operation!(
    AllocateTaskNumber,
    verb = "allocate",
    noun = "number",
    description = "Allocate the next task number of a project"
);

impl AllocateTaskNumber {
    pub fn new(org: impl Into<OrgId>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            org: org.into(),
            project_id: project_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AllocateTaskNumber {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let number = ctx
            .db()
            .write(project_resource(&self.project_id), move |tx| {
                allocate_next(tx, &cmd.org, &cmd.project_id)
            })
            .await?;
        Ok(json!({ "project_id": self.project_id, "number": number }))
    }
}

/// Counter value without incrementing, for diagnostics
pub(crate) fn peek(conn: &Connection, project_id: &ProjectId) -> Result<i64> {
    conn.query_row(
        "SELECT last_number FROM project_counters WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Counter, project_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::AddProject;
    use crate::test_support::setup;

    #[tokio::test]
    async fn test_numbers_increase() {
        let (_temp, ctx) = setup();
        let project = AddProject::new("acme", "WS", "Workscribe")
            .execute(&ctx)
            .await
            .unwrap();
        let project_id = project["id"].as_str().unwrap().to_string();

        for expected in 1..=3 {
            let result = AllocateTaskNumber::new("acme", project_id.as_str())
                .execute(&ctx)
                .await
                .unwrap();
            assert_eq!(result["number"], expected);
        }
    }

    #[tokio::test]
    async fn test_unknown_or_foreign_project_is_not_found() {
        let (_temp, ctx) = setup();
        let project = AddProject::new("acme", "WS", "Workscribe")
            .execute(&ctx)
            .await
            .unwrap();
        let project_id = project["id"].as_str().unwrap();

        let result = AllocateTaskNumber::new("other-org", project_id)
            .execute(&ctx)
            .await;
        assert!(matches!(
            result,
            Err(TrackerError::NotFound {
                entity: EntityKind::Project,
                ..
            })
        ));

        let result = AllocateTaskNumber::new("acme", "missing").execute(&ctx).await;
        assert!(matches!(result, Err(TrackerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_counter_row_is_created() {
        let (_temp, ctx) = setup();
        let project = AddProject::new("acme", "WS", "Workscribe")
            .execute(&ctx)
            .await
            .unwrap();
        let project_id = ProjectId::from(project["id"].as_str().unwrap());

        let id = project_id.clone();
        ctx.db()
            .write("test", move |tx| {
                tx.execute("DELETE FROM project_counters WHERE project_id = ?1", params![id])?;
                Ok(())
            })
            .await
            .unwrap();

        let result = AllocateTaskNumber::new("acme", project_id.clone())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(result["number"], 1);

        let value = ctx
            .db()
            .read(move |conn| peek(conn, &project_id))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }
}
