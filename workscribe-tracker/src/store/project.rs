use crate::error::{Result, TrackerError};
use crate::types::{EntityKind, OrgId, Project, ProjectId, StatusId, TaskStatus};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

const PROJECT_COLUMNS: &str = "id, org_id, key, name, created_at";
const STATUS_COLUMNS: &str = "id, project_id, name, category, sort_order";

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        org_id: row.get(1)?,
        key: row.get(2)?,
        name: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_status(row: &Row<'_>) -> rusqlite::Result<TaskStatus> {
    Ok(TaskStatus {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        order: row.get(4)?,
    })
}

/// Insert a project together with its counter row
pub(crate) fn insert_project(conn: &Connection, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects (id, org_id, key, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            project.id,
            project.org_id,
            project.key,
            project.name,
            project.created_at
        ],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => TrackerError::conflict(
            EntityKind::Project,
            &project.key,
            "project key already in use",
        ),
        _ => e.into(),
    })?;
    conn.execute(
        "INSERT INTO project_counters (project_id, last_number) VALUES (?1, 0)",
        params![project.id],
    )?;
    Ok(())
}

pub(crate) fn get_project(conn: &Connection, org: &OrgId, id: &ProjectId) -> Result<Project> {
    conn.query_row(
        &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1 AND org_id = ?2"),
        params![id, org],
        row_to_project,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Project, id))
}

pub(crate) fn list_projects(conn: &Connection, org: &OrgId) -> Result<Vec<Project>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE org_id = ?1 ORDER BY key"
    ))?;
    let projects = stmt
        .query_map(params![org], row_to_project)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(projects)
}

pub(crate) fn insert_status(conn: &Connection, status: &TaskStatus) -> Result<()> {
    conn.execute(
        "INSERT INTO task_statuses (id, project_id, name, category, sort_order) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            status.id,
            status.project_id,
            status.name,
            status.category,
            status.order
        ],
    )?;
    Ok(())
}

pub(crate) fn list_statuses(conn: &Connection, project_id: &ProjectId) -> Result<Vec<TaskStatus>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STATUS_COLUMNS} FROM task_statuses WHERE project_id = ?1 ORDER BY sort_order"
    ))?;
    let statuses = stmt
        .query_map(params![project_id], row_to_status)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(statuses)
}

/// A status column, which must belong to `project_id`
pub(crate) fn get_status(
    conn: &Connection,
    project_id: &ProjectId,
    id: &StatusId,
) -> Result<TaskStatus> {
    conn.query_row(
        &format!("SELECT {STATUS_COLUMNS} FROM task_statuses WHERE id = ?1 AND project_id = ?2"),
        params![id, project_id],
        row_to_status,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Status, id))
}
