//! Project commands

mod add;
mod get;

pub use add::AddProject;
pub use get::{GetProject, ListProjects};

use crate::types::{Project, TaskStatus};
use serde::Serialize;

/// A project with its board columns
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub statuses: Vec<TaskStatus>,
    pub last_task_number: i64,
}
