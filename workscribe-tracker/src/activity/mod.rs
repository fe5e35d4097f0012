//! Append-only activity log
//!
//! Entries are written by mutating commands inside their own transaction via
//! [`log_activity`], so an entry exists exactly when its mutation committed.
//! Each entry is also emitted as a tracing event under the
//! `workscribe::activity` target.

mod list;

pub use list::ListActivity;

use crate::error::Result;
use crate::store;
use crate::types::{ActivityEntry, NewActivity};
use rusqlite::Connection;
use tracing::info;

/// Tracing target for activity events
pub const ACTIVITY_TARGET: &str = "workscribe::activity";

/// Append one entry inside the caller's transaction
pub fn log_activity(conn: &Connection, entry: NewActivity) -> Result<ActivityEntry> {
    let entry = store::insert_activity(conn, entry)?;
    info!(
        target: ACTIVITY_TARGET,
        seq = entry.seq,
        org = %entry.org_id,
        actor = %entry.actor_id,
        action = %entry.action,
        entity_type = %entry.entity_type,
        entity_id = %entry.entity_id,
        task = entry.task_id.as_ref().map(|t| t.as_str()),
        "activity"
    );
    Ok(entry)
}

/// Append several entries inside the caller's transaction
pub fn log_all(
    conn: &Connection,
    entries: impl IntoIterator<Item = NewActivity>,
) -> Result<Vec<ActivityEntry>> {
    entries
        .into_iter()
        .map(|entry| log_activity(conn, entry))
        .collect()
}
