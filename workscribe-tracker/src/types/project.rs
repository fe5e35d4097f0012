//! Projects, their board columns and the entity kinds used in references

use super::ids::{OrgId, ProjectId, StatusId};
use super::sql::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of entity referenced by errors, activity entries and notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Counter,
    Status,
    Task,
    Sprint,
    Comment,
    Page,
    Link,
    Notification,
    /// A stored row whose kind could not be determined
    Record,
}

text_enum!(EntityKind {
    Project => "project",
    Counter => "counter",
    Status => "status",
    Task => "task",
    Sprint => "sprint",
    Comment => "comment",
    Page => "page",
    Link => "link",
    Notification => "notification",
    Record => "record",
});

impl EntityKind {
    /// Entity stored in `table`
    pub(crate) fn from_table(table: &str) -> Self {
        match table {
            "projects" => Self::Project,
            "project_counters" => Self::Counter,
            "task_statuses" => Self::Status,
            "tasks" => Self::Task,
            "sprints" => Self::Sprint,
            "comments" => Self::Comment,
            "pages" => Self::Page,
            "task_page_links" => Self::Link,
            "notifications" => Self::Notification,
            _ => Self::Record,
        }
    }
}

/// A project owning a task counter, board columns, tasks and sprints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub org_id: OrgId,
    /// Short uppercase key used in task display keys (`WS-12`)
    pub key: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Human readable key for a task number in this project
    pub fn task_key(&self, number: i64) -> String {
        format!("{}-{}", self.key, number)
    }
}

/// Workflow category of a board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Todo,
    InProgress,
    Done,
}

text_enum!(StatusCategory {
    Todo => "todo",
    InProgress => "in_progress",
    Done => "done",
});

/// A status column on a project board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: StatusId,
    pub project_id: ProjectId,
    pub name: String,
    pub category: StatusCategory,
    /// Left-to-right column order
    pub order: i64,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        self.category == StatusCategory::Done
    }
}

/// Columns every new project starts with
pub const DEFAULT_STATUSES: [(&str, StatusCategory); 3] = [
    ("To Do", StatusCategory::Todo),
    ("In Progress", StatusCategory::InProgress),
    ("Done", StatusCategory::Done),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_key() {
        let project = Project {
            id: ProjectId::new(),
            org_id: OrgId::from("acme"),
            key: "WS".into(),
            name: "Workscribe".into(),
            created_at: Utc::now(),
        };
        assert_eq!(project.task_key(12), "WS-12");
    }

    #[test]
    fn test_status_category_parse() {
        assert_eq!(
            "in_progress".parse::<StatusCategory>().unwrap(),
            StatusCategory::InProgress
        );
        assert!("doing".parse::<StatusCategory>().is_err());
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Sprint.to_string(), "sprint");
    }
}
