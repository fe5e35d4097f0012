use super::{json_from_row, json_to_sql};
use crate::error::Result;
use crate::types::{ActivityEntry, ActivityId, EntityKind, NewActivity, OrgId, TaskId};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const ACTIVITY_COLUMNS: &str = "seq, id, org_id, task_id, actor_id, action, entity_type, \
     entity_id, old_value, new_value, created_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ActivityEntry> {
    Ok(ActivityEntry {
        seq: row.get(0)?,
        id: row.get(1)?,
        org_id: row.get(2)?,
        task_id: row.get(3)?,
        actor_id: row.get(4)?,
        action: row.get(5)?,
        entity_type: row.get(6)?,
        entity_id: row.get(7)?,
        old_value: json_from_row(row, 8)?,
        new_value: json_from_row(row, 9)?,
        created_at: row.get(10)?,
    })
}

/// Append an entry. There is no update or delete counterpart.
pub(crate) fn insert_activity(conn: &Connection, entry: NewActivity) -> Result<ActivityEntry> {
    let id = ActivityId::new();
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO activity_log (id, org_id, task_id, actor_id, action, entity_type, entity_id, \
         old_value, new_value, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            entry.org_id,
            entry.task_id,
            entry.actor_id,
            entry.action,
            entry.entity_type,
            entry.entity_id,
            json_to_sql(&entry.old_value)?,
            json_to_sql(&entry.new_value)?,
            created_at
        ],
    )?;

    Ok(ActivityEntry {
        id,
        seq: conn.last_insert_rowid(),
        org_id: entry.org_id,
        task_id: entry.task_id,
        actor_id: entry.actor_id,
        action: entry.action,
        entity_type: entry.entity_type,
        entity_id: entry.entity_id,
        old_value: entry.old_value,
        new_value: entry.new_value,
        created_at,
    })
}

/// What an activity listing is about
#[derive(Debug, Clone)]
pub(crate) enum ActivityScope<'a> {
    Task(&'a TaskId),
    Entity(EntityKind, &'a str),
}

/// Entries newest first
pub(crate) fn list_activity(
    conn: &Connection,
    org: &OrgId,
    scope: ActivityScope<'_>,
    limit: Option<usize>,
) -> Result<Vec<ActivityEntry>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let entries = match scope {
        ActivityScope::Task(task_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activity_log \
                 WHERE org_id = ?1 AND task_id = ?2 ORDER BY seq DESC LIMIT ?3"
            ))?;
            let rows = stmt
                .query_map(params![org, task_id, limit], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        ActivityScope::Entity(kind, entity_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTIVITY_COLUMNS} FROM activity_log \
                 WHERE org_id = ?1 AND entity_type = ?2 AND entity_id = ?3 \
                 ORDER BY seq DESC LIMIT ?4"
            ))?;
            let rows = stmt
                .query_map(params![org, kind, entity_id, limit], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(entries)
}
