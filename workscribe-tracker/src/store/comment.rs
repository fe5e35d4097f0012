use crate::error::{Result, TrackerError};
use crate::types::{Comment, EntityKind, PageId, TaskId, TaskPageLink};
use rusqlite::{params, Connection, ErrorCode};

pub(crate) fn insert_comment(conn: &Connection, comment: &Comment) -> Result<()> {
    conn.execute(
        "INSERT INTO comments (id, task_id, author_id, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comment.id,
            comment.task_id,
            comment.author_id,
            comment.body,
            comment.created_at
        ],
    )?;
    Ok(())
}

/// Comments of a task, oldest first
pub(crate) fn list_comments(conn: &Connection, task_id: &TaskId) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, author_id, body, created_at FROM comments \
         WHERE task_id = ?1 ORDER BY created_at, id",
    )?;
    let comments = stmt
        .query_map(params![task_id], |row| {
            Ok(Comment {
                id: row.get(0)?,
                task_id: row.get(1)?,
                author_id: row.get(2)?,
                body: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(comments)
}

pub(crate) fn insert_link(conn: &Connection, link: &TaskPageLink) -> Result<()> {
    conn.execute(
        "INSERT INTO task_page_links (task_id, page_id, created_by, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![link.task_id, link.page_id, link.created_by, link.created_at],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => TrackerError::conflict(
            EntityKind::Link,
            format!("{}:{}", link.task_id, link.page_id),
            "task is already linked to this page",
        ),
        _ => e.into(),
    })?;
    Ok(())
}

/// Remove a link; `NotFound` if it did not exist
pub(crate) fn delete_link(conn: &Connection, task_id: &TaskId, page_id: &PageId) -> Result<()> {
    let removed = conn.execute(
        "DELETE FROM task_page_links WHERE task_id = ?1 AND page_id = ?2",
        params![task_id, page_id],
    )?;
    if removed == 0 {
        return Err(TrackerError::not_found(
            EntityKind::Link,
            format!("{}:{}", task_id, page_id),
        ));
    }
    Ok(())
}
