//! Project tracking engine for Workscribe
//!
//! This crate holds the consistency-critical core of the tracker: per-project
//! task numbering, sparse board ordering, the sprint lifecycle, the
//! append-only activity log and notification dispatch. Data lives in a single
//! SQLite database; every mutation runs inside one immediate transaction.
//!
//! ## Overview
//!
//! - **Tenant scoped** - every command carries an organization; entities of
//!   other organizations are reported as not found
//! - **Commands** - each operation is a struct implementing [`Execute`],
//!   returning a JSON value
//! - **Retryable contention** - lock waits that exceed the configured timeout
//!   surface as [`TrackerError::Contention`], which
//!   [`TrackerOperationProcessor`] retries
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use workscribe_tracker::{project::AddProject, task::AddTask, Execute, TrackerContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = TrackerContext::open_at("/tmp/workscribe.db")?;
//! let project = AddProject::new("acme", "WS", "Workscribe").execute(&ctx).await?;
//!
//! let task = AddTask::new("acme", "alice", project["id"].as_str().unwrap_or_default(), "Write docs")
//!     .with_assignee("bob")
//!     .execute(&ctx)
//!     .await?;
//!
//! println!("Created {}", task["key"]);
//! # Ok(())
//! # }
//! ```

mod context;
pub mod counter;
mod error;
pub mod operation;
pub mod ordering;
mod processor;
pub mod store;
pub mod types;

// Command modules
pub mod activity;
pub mod comment;
pub mod notification;
pub mod page;
pub mod project;
pub mod sprint;
pub mod task;

pub use async_trait::async_trait;
pub use context::TrackerContext;
pub use error::{ErrorKind, ErrorSeverity, Result, TrackerError};
pub use notification::{ConnectionRegistry, Notifier, PushOutcome};
pub use operation::{Execute, Operation};
pub use ordering::{OrderingRules, Placement};
pub use processor::TrackerOperationProcessor;
pub use store::Database;

// Re-export commonly used types
pub use types::{
    ActivityAction, ActivityEntry, ActorId, Comment, Disposition, EntityKind, Notification,
    NotificationType, OrgId, PageId, PageNode, Project, ProjectId, SpaceId, Sprint, SprintId,
    SprintStatus, StatusId, Task, TaskId, TaskPriority, TaskStatus, TaskType,
};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::project::AddProject;
    use crate::task::AddTask;
    use crate::{Execute, TrackerContext};
    use tempfile::TempDir;

    /// A context over a fresh database in a temp dir. Keep the `TempDir`
    /// alive for the duration of the test.
    pub fn setup() -> (TempDir, TrackerContext) {
        let temp = TempDir::new().unwrap();
        let ctx = TrackerContext::open_at(temp.path().join("tracker.db")).unwrap();
        (temp, ctx)
    }

    /// Project `WS` in org `acme` with its default columns
    pub struct Board {
        pub project_id: String,
        pub todo: String,
        pub in_progress: String,
        pub done: String,
    }

    pub async fn board(ctx: &TrackerContext) -> Board {
        let project = AddProject::new("acme", "WS", "Workscribe")
            .execute(ctx)
            .await
            .unwrap();
        let column = |i: usize| project["statuses"][i]["id"].as_str().unwrap().to_string();
        Board {
            project_id: project["id"].as_str().unwrap().to_string(),
            todo: column(0),
            in_progress: column(1),
            done: column(2),
        }
    }

    /// Add a task reported by `alice` to the first column
    pub async fn add_task(ctx: &TrackerContext, board: &Board, title: &str) -> String {
        let task = AddTask::new("acme", "alice", board.project_id.as_str(), title)
            .execute(ctx)
            .await
            .unwrap();
        task["id"].as_str().unwrap().to_string()
    }
}
