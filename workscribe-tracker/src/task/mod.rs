//! Task commands

mod add;
mod delete;
mod get;
mod link;
mod list;
mod mv;
mod reorder;
mod update;

pub use add::AddTask;
pub use delete::DeleteTask;
pub use get::GetTask;
pub use link::{LinkPage, UnlinkPage};
pub use list::ListTasks;
pub use mv::MoveTask;
pub use reorder::{ReorderItem, ReorderTasks};
pub use update::UpdateTask;

use crate::types::TaskId;

/// Lock resource label for a single task
pub(crate) fn task_resource(id: &TaskId) -> String {
    format!("task {}", id)
}
