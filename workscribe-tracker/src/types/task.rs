//! Task, comment and link types

use super::ids::{ActorId, CommentId, OrgId, PageId, ProjectId, SprintId, StatusId, TaskId};
use super::sql::text_enum;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    None,
}

text_enum!(TaskPriority {
    Urgent => "urgent",
    High => "high",
    Medium => "medium",
    Low => "low",
    None => "none",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Story,
    Bug,
    #[default]
    Task,
    Subtask,
}

text_enum!(TaskType {
    Story => "story",
    Bug => "bug",
    Task => "task",
    Subtask => "subtask",
});

/// A work item on a project board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub org_id: OrgId,
    pub project_id: ProjectId,
    /// Per-project sequence number, immutable once assigned
    pub number: i64,
    /// Display key such as `WS-12`
    pub key: String,
    pub title: String,
    pub status_id: StatusId,
    /// Sparse ordering key within the status column
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<SprintId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<ActorId>,
    pub reporter_id: ActorId,
    pub priority: TaskPriority,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub author_id: ActorId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Actors mentioned with `@<actor-id>` tokens, deduplicated in order of appearance
    pub fn mentions(&self) -> Vec<ActorId> {
        let mut found: Vec<ActorId> = Vec::new();
        for word in self.body.split_whitespace() {
            let Some(rest) = word.strip_prefix('@') else {
                continue;
            };
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect();
            let name = name.trim_end_matches('.');
            if name.is_empty() {
                continue;
            }
            let actor = ActorId::from(name);
            if !found.contains(&actor) {
                found.push(actor);
            }
        }
        found
    }
}

/// A link between a task and a wiki page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPageLink {
    pub task_id: TaskId,
    pub page_id: PageId,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(body: &str) -> Comment {
        Comment {
            id: CommentId::new(),
            task_id: TaskId::new(),
            author_id: ActorId::from("author"),
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mentions_are_extracted() {
        let c = comment("hey @alice and @bob.smith, see above");
        assert_eq!(
            c.mentions(),
            vec![ActorId::from("alice"), ActorId::from("bob.smith")]
        );
    }

    #[test]
    fn test_mentions_are_deduplicated() {
        let c = comment("@alice @alice. @alice!");
        assert_eq!(c.mentions(), vec![ActorId::from("alice")]);
    }

    #[test]
    fn test_bare_at_sign_is_ignored() {
        let c = comment("email me @ home");
        assert!(c.mentions().is_empty());
    }

    #[test]
    fn test_task_type_serializes_as_type() {
        assert_eq!(
            serde_json::to_value(TaskType::Bug).unwrap(),
            serde_json::json!("bug")
        );
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }
}
