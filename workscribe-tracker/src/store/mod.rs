//! SQLite-backed store
//!
//! Every unit of work opens its own connection on a blocking thread and runs
//! inside a `BEGIN IMMEDIATE` transaction, which holds the database write
//! lock until commit or rollback. A second writer waits up to the configured
//! lock timeout and then fails with [`TrackerError::Contention`].
//!
//! The entity modules are plain functions over `&Connection` so commands can
//! compose several of them inside one transaction.

mod activity;
mod comment;
mod notification;
mod page;
mod project;
mod schema;
mod sprint;
mod task;

pub(crate) use activity::{insert_activity, list_activity, ActivityScope};
pub(crate) use comment::{insert_comment, insert_link, delete_link, list_comments};
pub(crate) use notification::{
    insert_notification, list_notifications, mark_all_read, mark_read,
};
pub(crate) use page::{
    descendant_ids, get_page, insert_page, list_pages, page_siblings, set_page_position,
    shift_depths,
};
pub(crate) use project::{
    get_project, get_status, insert_project, insert_status, list_projects, list_statuses,
};
pub(crate) use sprint::{
    active_sprint, delete_sprint, get_sprint, insert_sprint, list_sprint_summaries,
    set_sprint_status, update_sprint,
};
pub(crate) use task::{
    column_positions, delete_task, detach_subtasks, get_task, incomplete_in_sprint, insert_task,
    list_tasks, set_task_position, set_task_sprint, tasks_in_sprint, update_task, TaskFilter,
};

use crate::error::{Result, TrackerError};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use workscribe_config::StoreConfig;

/// Handle to the tracker database file
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    lock_timeout: Duration,
}

impl Database {
    /// Open (creating if needed) the database and apply the schema
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Self {
            path: config.path.clone(),
            lock_timeout: Duration::from_millis(config.lock_timeout_ms),
        };

        let conn = db.connect()?;
        // WAL is persistent, so later connections inherit it
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(schema::SCHEMA)?;

        debug!(path = %db.path.display(), "opened tracker database");
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    /// Open a new connection with the tracker pragmas applied
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.lock_timeout)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Run `f` inside an immediate (write-locked) transaction.
    ///
    /// `resource` names what the lock protects and is reported on contention.
    /// The transaction commits only if `f` returns `Ok`.
    pub async fn write<T, F>(&self, resource: impl Into<String>, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
    {
        let db = self.clone();
        let resource = resource.into();
        tokio::task::spawn_blocking(move || db.write_blocking(&resource, f)).await?
    }

    /// Run `f` against a fresh connection without taking the write lock
    pub async fn read<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let conn = db.connect()?;
            f(&conn).map_err(|e| relabel_contention(e, "database", started))
        })
        .await?
    }

    fn write_blocking<T>(
        &self,
        resource: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();
        let mut conn = self.connect()?;
        let result = in_immediate_transaction(&mut conn, f);
        trace!(resource, elapsed_ms = started.elapsed().as_millis() as u64, ok = result.is_ok(), "write unit finished");
        result.map_err(|e| relabel_contention(e, resource, started))
    }
}

fn in_immediate_transaction<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Attach the locked resource and the time actually waited to a contention error
fn relabel_contention(err: TrackerError, resource: &str, started: Instant) -> TrackerError {
    match err {
        TrackerError::Contention { .. } => {
            TrackerError::contention(resource, started.elapsed().as_millis() as u64)
        }
        other => other,
    }
}

/// Encode an optional JSON value for a TEXT column
pub(crate) fn json_to_sql(value: &Option<serde_json::Value>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(TrackerError::from)
}

/// Decode an optional JSON TEXT column inside a row mapper
pub(crate) fn json_from_row(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<serde_json::Value>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        serde_json::from_str(&t).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}
