//! AddTask command

use crate::activity;
use crate::context::TrackerContext;
use crate::counter::{self, project_resource};
use crate::error::{Result, TrackerError};
use crate::notification::{assignment_notice, Notifier};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{
    ActivityAction, ActorId, EntityKind, NewActivity, OrgId, ProjectId, SprintId, StatusId, Task,
    TaskId, TaskPriority, TaskType,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// Create a task at the end of a status column
#[derive(Debug, Clone, Deserialize)]
pub struct AddTask {
    pub org: OrgId,
    /// Reporter of the new task
    pub actor: ActorId,
    pub project_id: ProjectId,
    pub title: String,
    /// Column to create the task in; the project's first column when absent
    pub status_id: Option<StatusId>,
    pub assignee: Option<ActorId>,
    pub sprint_id: Option<SprintId>,
    pub parent_task_id: Option<TaskId>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, rename = "type")]
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
}

operation!(
    AddTask,
    verb = "add",
    noun = "task",
    description = "Create a new task in a project"
);

impl AddTask {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        project_id: impl Into<ProjectId>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            project_id: project_id.into(),
            title: title.into(),
            status_id: None,
            assignee: None,
            sprint_id: None,
            parent_task_id: None,
            priority: TaskPriority::default(),
            task_type: TaskType::default(),
            due_date: None,
        }
    }

    pub fn in_status(mut self, status_id: impl Into<StatusId>) -> Self {
        self.status_id = Some(status_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<ActorId>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn in_sprint(mut self, sprint_id: impl Into<SprintId>) -> Self {
        self.sprint_id = Some(sprint_id.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<TaskId>) -> Self {
        self.parent_task_id = Some(parent.into());
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddTask {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TrackerError::invalid_argument("title", "must not be empty"));
        }

        let cmd = self.clone();
        let rules = ctx.ordering();
        let (task, notifications) = ctx
            .db()
            .write(project_resource(&self.project_id), move |tx| {
                let project = store::get_project(tx, &cmd.org, &cmd.project_id)?;

                let status = match &cmd.status_id {
                    Some(id) => store::get_status(tx, &project.id, id)?,
                    None => store::list_statuses(tx, &project.id)?
                        .into_iter()
                        .next()
                        .ok_or_else(|| {
                            TrackerError::invalid_argument("status_id", "project has no columns")
                        })?,
                };

                if let Some(parent_id) = &cmd.parent_task_id {
                    let parent = store::get_task(tx, &cmd.org, parent_id)?;
                    if parent.project_id != project.id {
                        return Err(TrackerError::invalid_argument(
                            "parent_task_id",
                            "parent task belongs to another project",
                        ));
                    }
                }

                if let Some(sprint_id) = &cmd.sprint_id {
                    let sprint = store::get_sprint(tx, &cmd.org, sprint_id)?;
                    if sprint.project_id != project.id {
                        return Err(TrackerError::invalid_argument(
                            "sprint_id",
                            "sprint belongs to another project",
                        ));
                    }
                    if sprint.status.is_frozen() {
                        return Err(TrackerError::conflict(
                            EntityKind::Sprint,
                            sprint_id,
                            "sprint is completed",
                        ));
                    }
                }

                let number = counter::allocate_next(tx, &cmd.org, &project.id)?;
                let siblings = store::column_positions(tx, &status.id, None)?;
                let placement = rules.append(&siblings);
                let now = Utc::now();
                for (sibling, position) in &placement.rebalanced {
                    store::set_task_position(tx, sibling, *position, now)?;
                }

                let task = Task {
                    id: TaskId::new(),
                    org_id: cmd.org.clone(),
                    project_id: project.id.clone(),
                    number,
                    key: project.task_key(number),
                    title,
                    status_id: status.id.clone(),
                    position: placement.position,
                    sprint_id: cmd.sprint_id.clone(),
                    parent_task_id: cmd.parent_task_id.clone(),
                    assignee_id: cmd.assignee.clone(),
                    reporter_id: cmd.actor.clone(),
                    priority: cmd.priority,
                    task_type: cmd.task_type,
                    due_date: cmd.due_date,
                    created_at: now,
                    updated_at: now,
                };
                store::insert_task(tx, &task)?;

                activity::log_activity(
                    tx,
                    NewActivity::for_task(&task.org_id, &task.id, &cmd.actor, ActivityAction::TaskCreated)
                        .with_new(json!({ "key": task.key, "title": task.title })),
                )?;

                let notifications =
                    Notifier::record_all(tx, assignment_notice(&task, &cmd.actor))?;
                Ok((task, notifications))
            })
            .await?;

        ctx.notifier().push_all(&notifications);
        Ok(serde_json::to_value(&task)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::{AddSprint, CompleteSprint, StartSprint};
    use crate::test_support::{board, setup};
    use crate::types::Disposition;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_add_task_numbers_and_positions() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;

        let first = AddTask::new("acme", "alice", b.project_id.as_str(), "First")
            .execute(&ctx)
            .await
            .unwrap();
        let second = AddTask::new("acme", "alice", b.project_id.as_str(), "Second")
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(first["number"], 1);
        assert_eq!(first["key"], "WS-1");
        assert_eq!(second["number"], 2);
        assert_eq!(first["status_id"], b.todo.as_str());
        assert_eq!(first["position"], 1000);
        assert_eq!(second["position"], 2000);
        assert_eq!(first["reporter_id"], "alice");
    }

    #[tokio::test]
    async fn test_add_task_rejects_empty_title() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let result = AddTask::new("acme", "alice", b.project_id.as_str(), "   ")
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_add_task_to_foreign_status_is_not_found() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let result = AddTask::new("acme", "alice", b.project_id.as_str(), "Task")
            .in_status("no-such-status")
            .execute(&ctx)
            .await;
        assert!(matches!(
            result,
            Err(TrackerError::NotFound {
                entity: EntityKind::Status,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_add_task_to_completed_sprint_conflicts() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let sprint = AddSprint::new("acme", "alice", b.project_id.as_str(), "Sprint 1")
            .execute(&ctx)
            .await
            .unwrap();
        let sprint_id = sprint["id"].as_str().unwrap();
        StartSprint::new("acme", "alice", sprint_id).execute(&ctx).await.unwrap();
        CompleteSprint::new("acme", "alice", sprint_id, Disposition::Backlog)
            .execute(&ctx)
            .await
            .unwrap();

        let result = AddTask::new("acme", "alice", b.project_id.as_str(), "Late")
            .in_sprint(sprint_id)
            .execute(&ctx)
            .await;
        assert!(matches!(result, Err(TrackerError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_failed_add_does_not_consume_number() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        assert_err!(
            AddTask::new("acme", "alice", b.project_id.as_str(), "Orphan")
                .with_parent("missing")
                .execute(&ctx)
                .await
        );
        let ok = AddTask::new("acme", "alice", b.project_id.as_str(), "Real")
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(ok["number"], 1);
    }

    #[tokio::test]
    async fn test_assignee_is_notified() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let mut inbox = ctx.notifier().connect("bob");

        AddTask::new("acme", "alice", b.project_id.as_str(), "Review PR")
            .with_assignee("bob")
            .execute(&ctx)
            .await
            .unwrap();

        let pushed = inbox.recv().await.unwrap();
        assert_eq!(pushed.recipient_id, ActorId::from("bob"));
        assert_eq!(pushed.title, "WS-1 was assigned to you");
    }
}
