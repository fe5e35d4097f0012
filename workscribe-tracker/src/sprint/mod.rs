//! Sprint lifecycle commands
//!
//! A sprint moves `planned -> active -> completed` and never back. At most
//! one sprint per project is active; the check runs inside the same write
//! transaction as the transition and a partial unique index backs it up.

mod add;
mod complete;
mod delete;
mod list;
mod start;
mod update;

pub use add::AddSprint;
pub use complete::CompleteSprint;
pub use delete::DeleteSprint;
pub use list::ListSprints;
pub use start::StartSprint;
pub use update::UpdateSprint;

use crate::error::{Result, TrackerError};
use crate::types::{EntityKind, Sprint, SprintStatus};

/// Lock resource label for a sprint
pub(crate) fn sprint_resource(id: &crate::types::SprintId) -> String {
    format!("sprint {}", id)
}

/// `Conflict` unless `sprint` may move to `next`
fn ensure_transition(sprint: &Sprint, next: SprintStatus) -> Result<()> {
    if sprint.status.can_transition_to(next) {
        return Ok(());
    }
    Err(TrackerError::conflict(
        EntityKind::Sprint,
        &sprint.id,
        format!("cannot move a {} sprint to {}", sprint.status, next),
    ))
}
