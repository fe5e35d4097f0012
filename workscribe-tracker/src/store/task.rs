use crate::error::{Result, TrackerError};
use crate::types::{EntityKind, OrgId, ProjectId, SprintId, StatusId, Task, TaskId};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TASK_COLUMNS: &str = "t.id, t.org_id, t.project_id, t.number, t.key, t.title, t.status_id, \
     t.position, t.sprint_id, t.parent_task_id, t.assignee_id, t.reporter_id, t.priority, \
     t.task_type, t.due_date, t.created_at, t.updated_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        org_id: row.get(1)?,
        project_id: row.get(2)?,
        number: row.get(3)?,
        key: row.get(4)?,
        title: row.get(5)?,
        status_id: row.get(6)?,
        position: row.get(7)?,
        sprint_id: row.get(8)?,
        parent_task_id: row.get(9)?,
        assignee_id: row.get(10)?,
        reporter_id: row.get(11)?,
        priority: row.get(12)?,
        task_type: row.get(13)?,
        due_date: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

/// Which tasks of a project to list
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskFilter {
    pub status_id: Option<StatusId>,
    pub sprint_id: Option<SprintId>,
    /// Only tasks without a sprint
    pub backlog: bool,
}

pub(crate) fn insert_task(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "INSERT INTO tasks (id, org_id, project_id, number, key, title, status_id, position, \
         sprint_id, parent_task_id, assignee_id, reporter_id, priority, task_type, due_date, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            task.id,
            task.org_id,
            task.project_id,
            task.number,
            task.key,
            task.title,
            task.status_id,
            task.position,
            task.sprint_id,
            task.parent_task_id,
            task.assignee_id,
            task.reporter_id,
            task.priority,
            task.task_type,
            task.due_date,
            task.created_at,
            task.updated_at
        ],
    )?;
    Ok(())
}

pub(crate) fn get_task(conn: &Connection, org: &OrgId, id: &TaskId) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1 AND t.org_id = ?2"),
        params![id, org],
        row_to_task,
    )
    .optional()?
    .ok_or_else(|| TrackerError::not_found(EntityKind::Task, id))
}

/// Persist every mutable field of `task`. Number and key never change.
pub(crate) fn update_task(conn: &Connection, task: &Task) -> Result<()> {
    conn.execute(
        "UPDATE tasks SET title = ?2, status_id = ?3, position = ?4, sprint_id = ?5, \
         parent_task_id = ?6, assignee_id = ?7, priority = ?8, task_type = ?9, due_date = ?10, \
         updated_at = ?11 WHERE id = ?1",
        params![
            task.id,
            task.title,
            task.status_id,
            task.position,
            task.sprint_id,
            task.parent_task_id,
            task.assignee_id,
            task.priority,
            task.task_type,
            task.due_date,
            task.updated_at
        ],
    )?;
    Ok(())
}

pub(crate) fn delete_task(conn: &Connection, id: &TaskId) -> Result<()> {
    conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    Ok(())
}

/// Clear the parent of every subtask of `parent`; returns how many were detached
pub(crate) fn detach_subtasks(
    conn: &Connection,
    parent: &TaskId,
    now: DateTime<Utc>,
) -> Result<Vec<TaskId>> {
    let mut stmt = conn.prepare(
        "UPDATE tasks SET parent_task_id = NULL, updated_at = ?2 WHERE parent_task_id = ?1 \
         RETURNING id",
    )?;
    let ids = stmt
        .query_map(params![parent, now], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

/// `(id, position)` of the tasks in a status column, ascending, optionally
/// leaving one task out
pub(crate) fn column_positions(
    conn: &Connection,
    status_id: &StatusId,
    exclude: Option<&TaskId>,
) -> Result<Vec<(TaskId, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT id, position FROM tasks WHERE status_id = ?1 AND (?2 IS NULL OR id != ?2) \
         ORDER BY position, number",
    )?;
    let rows = stmt
        .query_map(params![status_id, exclude], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn set_task_position(
    conn: &Connection,
    id: &TaskId,
    position: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE tasks SET position = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, position, now],
    )?;
    Ok(())
}

pub(crate) fn set_task_sprint(
    conn: &Connection,
    id: &TaskId,
    sprint_id: Option<&SprintId>,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE tasks SET sprint_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, sprint_id, now],
    )?;
    Ok(())
}

pub(crate) fn list_tasks(
    conn: &Connection,
    org: &OrgId,
    project_id: &ProjectId,
    filter: &TaskFilter,
) -> Result<Vec<Task>> {
    let mut sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks t JOIN task_statuses s ON s.id = t.status_id \
         WHERE t.org_id = ?1 AND t.project_id = ?2"
    );
    let mut args: Vec<String> = vec![org.to_string(), project_id.to_string()];

    if let Some(status_id) = &filter.status_id {
        args.push(status_id.to_string());
        sql.push_str(&format!(" AND t.status_id = ?{}", args.len()));
    }
    if let Some(sprint_id) = &filter.sprint_id {
        args.push(sprint_id.to_string());
        sql.push_str(&format!(" AND t.sprint_id = ?{}", args.len()));
    } else if filter.backlog {
        sql.push_str(" AND t.sprint_id IS NULL");
    }
    sql.push_str(" ORDER BY s.sort_order, t.position, t.number");

    let mut stmt = conn.prepare(&sql)?;
    let tasks = stmt
        .query_map(params_from_iter(args.iter()), row_to_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

/// Tasks of a sprint whose status is not in a `done` column
pub(crate) fn incomplete_in_sprint(conn: &Connection, sprint_id: &SprintId) -> Result<Vec<TaskId>> {
    let mut stmt = conn.prepare(
        "SELECT t.id FROM tasks t JOIN task_statuses s ON s.id = t.status_id \
         WHERE t.sprint_id = ?1 AND s.category != 'done' ORDER BY t.number",
    )?;
    let ids = stmt
        .query_map(params![sprint_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

pub(crate) fn tasks_in_sprint(conn: &Connection, sprint_id: &SprintId) -> Result<Vec<TaskId>> {
    let mut stmt = conn.prepare("SELECT id FROM tasks WHERE sprint_id = ?1 ORDER BY number")?;
    let ids = stmt
        .query_map(params![sprint_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}
