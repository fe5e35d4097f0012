use crate::error::{Result, TrackerError};
use crate::types::{EntityKind, OrgId, ProjectId, Sprint, SprintId, SprintStatus, SprintSummary};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const SPRINT_COLUMNS: &str = "s.id, s.org_id, s.project_id, s.name, s.goal, s.status, \
     s.start_date, s.end_date, s.created_at, s.updated_at";

fn row_to_sprint(row: &Row<'_>) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: row.get(0)?,
        org_id: row.get(1)?,
        project_id: row.get(2)?,
        name: row.get(3)?,
        goal: row.get(4)?,
        status: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub(crate) fn insert_sprint(conn: &Connection, sprint: &Sprint) -> Result<()> {
    conn.execute(
        "INSERT INTO sprints (id, org_id, project_id, name, goal, status, start_date, end_date, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            sprint.id,
            sprint.org_id,
            sprint.project_id,
            sprint.name,
            sprint.goal,
            sprint.status,
            sprint.start_date,
            sprint.end_date,
            sprint.created_at,
            sprint.updated_at
        ],
    )?;
    Ok(())
}

pub(crate) fn get_sprint(conn: &Connection, org: &OrgId, id: &SprintId) -> Result<Sprint> {
    conn.query_row(
        &format!("SELECT {SPRINT_COLUMNS} FROM sprints s WHERE s.id = ?1 AND s.org_id = ?2"),
        params![id, org],
        row_to_sprint,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Sprint, id))
}

/// The project's active sprint, if any
pub(crate) fn active_sprint(conn: &Connection, project_id: &ProjectId) -> Result<Option<Sprint>> {
    let sprint = conn
        .query_row(
            &format!(
                "SELECT {SPRINT_COLUMNS} FROM sprints s WHERE s.project_id = ?1 AND s.status = 'active'"
            ),
            params![project_id],
            row_to_sprint,
        )
        .optional()?;
    Ok(sprint)
}

/// Name, goal and dates
pub(crate) fn update_sprint(conn: &Connection, sprint: &Sprint) -> Result<()> {
    conn.execute(
        "UPDATE sprints SET name = ?2, goal = ?3, start_date = ?4, end_date = ?5, updated_at = ?6 \
         WHERE id = ?1",
        params![
            sprint.id,
            sprint.name,
            sprint.goal,
            sprint.start_date,
            sprint.end_date,
            sprint.updated_at
        ],
    )?;
    Ok(())
}

/// Write a new lifecycle state. The partial unique index on active sprints
/// backs up the single-active check made by the caller.
pub(crate) fn set_sprint_status(
    conn: &Connection,
    sprint: &Sprint,
    status: SprintStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE sprints SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![sprint.id, status, now],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => TrackerError::conflict(
            EntityKind::Sprint,
            &sprint.id,
            "another sprint is already active in this project",
        ),
        _ => e.into(),
    })?;
    Ok(())
}

pub(crate) fn delete_sprint(conn: &Connection, id: &SprintId) -> Result<()> {
    conn.execute("DELETE FROM sprints WHERE id = ?1", params![id])?;
    Ok(())
}

/// Sprints of a project, oldest first, with total and done task counts
pub(crate) fn list_sprint_summaries(
    conn: &Connection,
    org: &OrgId,
    project_id: &ProjectId,
) -> Result<Vec<SprintSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SPRINT_COLUMNS}, \
           (SELECT COUNT(*) FROM tasks t WHERE t.sprint_id = s.id), \
           (SELECT COUNT(*) FROM tasks t JOIN task_statuses ts ON ts.id = t.status_id \
              WHERE t.sprint_id = s.id AND ts.category = 'done') \
         FROM sprints s WHERE s.org_id = ?1 AND s.project_id = ?2 \
         ORDER BY s.created_at, s.id"
    ))?;
    let summaries = stmt
        .query_map(params![org, project_id], |row| {
            Ok(SprintSummary {
                sprint: row_to_sprint(row)?,
                task_count: row.get(10)?,
                completed_task_count: row.get(11)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(summaries)
}
