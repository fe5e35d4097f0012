//! ReorderTasks command

use crate::activity;
use crate::context::TrackerContext;
use crate::counter::project_resource;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::ordering::validate_batch;
use crate::store;
use crate::types::{ActivityAction, ActorId, EntityKind, NewActivity, OrgId, ProjectId, TaskId};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Requested position for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderItem {
    pub id: TaskId,
    pub position: i64,
}

impl ReorderItem {
    pub fn new(id: impl Into<TaskId>, position: i64) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Set explicit positions for tasks of one column, all or nothing
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderTasks {
    pub org: OrgId,
    pub actor: ActorId,
    pub project_id: ProjectId,
    pub items: Vec<ReorderItem>,
}

operation!(
    ReorderTasks,
    verb = "reorder",
    noun = "tasks",
    description = "Apply a batch of task positions atomically"
);

impl ReorderTasks {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        project_id: impl Into<ProjectId>,
        items: Vec<ReorderItem>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            project_id: project_id.into(),
            items,
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ReorderTasks {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let pairs: Vec<(TaskId, i64)> = self
            .items
            .iter()
            .map(|item| (item.id.clone(), item.position))
            .collect();
        validate_batch(&pairs)?;

        let cmd = self.clone();
        let changed = ctx
            .db()
            .write(project_resource(&self.project_id), move |tx| {
                store::get_project(tx, &cmd.org, &cmd.project_id)?;

                let mut tasks = Vec::with_capacity(pairs.len());
                for (id, _) in &pairs {
                    let task = store::get_task(tx, &cmd.org, id)?;
                    if task.project_id != cmd.project_id {
                        return Err(TrackerError::not_found(EntityKind::Task, id));
                    }
                    tasks.push(task);
                }

                let column = tasks[0].status_id.clone();
                if tasks.iter().any(|t| t.status_id != column) {
                    return Err(TrackerError::invalid_argument(
                        "items",
                        "all tasks must be in the same status column",
                    ));
                }

                let now = Utc::now();
                let mut changed = 0usize;
                for (task, (_, position)) in tasks.iter().zip(&pairs) {
                    if task.position == *position {
                        continue;
                    }
                    store::set_task_position(tx, &task.id, *position, now)?;
                    activity::log_activity(
                        tx,
                        NewActivity::for_task(
                            &task.org_id,
                            &task.id,
                            &cmd.actor,
                            ActivityAction::TasksReordered,
                        )
                        .with_old(json!({ "position": task.position }))
                        .with_new(json!({ "position": position })),
                    )?;
                    changed += 1;
                }

                // Requested positions must not collide with tasks left out of the batch
                let mut seen = HashSet::new();
                for (id, position) in store::column_positions(tx, &column, None)? {
                    if !seen.insert(position) {
                        return Err(TrackerError::invalid_argument(
                            "items",
                            format!("position {} collides with task {}", position, id),
                        ));
                    }
                }

                Ok(changed)
            })
            .await?;

        Ok(json!({ "reordered": changed, "items": self.items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::MAX_POSITION;
    use crate::task::ListTasks;
    use crate::test_support::{add_task, board, setup, Board};

    async fn titles(ctx: &TrackerContext, b: &Board) -> Vec<String> {
        ListTasks::new("acme", b.project_id.as_str())
            .execute(ctx)
            .await
            .unwrap()["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_reorder_applies_requested_order() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let a = add_task(&ctx, &b, "A").await;
        let b2 = add_task(&ctx, &b, "B").await;
        let c = add_task(&ctx, &b, "C").await;

        let result = ReorderTasks::new(
            "acme",
            "alice",
            b.project_id.as_str(),
            vec![
                ReorderItem::new(c.as_str(), 100),
                ReorderItem::new(a.as_str(), 200),
                ReorderItem::new(b2.as_str(), 300),
            ],
        )
        .execute(&ctx)
        .await
        .unwrap();

        assert_eq!(result["reordered"], 3);
        assert_eq!(titles(&ctx, &b).await, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_reorder_rejects_bad_batches() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let a = add_task(&ctx, &b, "A").await;
        let b2 = add_task(&ctx, &b, "B").await;

        let empty = ReorderTasks::new("acme", "alice", b.project_id.as_str(), vec![])
            .execute(&ctx)
            .await;
        assert!(matches!(empty, Err(TrackerError::InvalidArgument { .. })));

        let dup_pos = ReorderTasks::new(
            "acme",
            "alice",
            b.project_id.as_str(),
            vec![ReorderItem::new(a.as_str(), 5), ReorderItem::new(b2.as_str(), 5)],
        )
        .execute(&ctx)
        .await;
        assert!(matches!(dup_pos, Err(TrackerError::InvalidArgument { .. })));

        let unknown = ReorderTasks::new(
            "acme",
            "alice",
            b.project_id.as_str(),
            vec![ReorderItem::new(a.as_str(), 5), ReorderItem::new("ghost", 6)],
        )
        .execute(&ctx)
        .await;
        assert!(matches!(unknown, Err(TrackerError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reorder_is_all_or_nothing() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let a = add_task(&ctx, &b, "A").await;
        let _b2 = add_task(&ctx, &b, "B").await;

        // A would land on B's position (2000), which is not part of the batch
        let result = ReorderTasks::new(
            "acme",
            "alice",
            b.project_id.as_str(),
            vec![ReorderItem::new(a.as_str(), 2000)],
        )
        .execute(&ctx)
        .await;
        assert!(matches!(result, Err(TrackerError::InvalidArgument { .. })));
        assert_eq!(titles(&ctx, &b).await, vec!["A", "B"]);

        let task = crate::task::GetTask::new("acme", a.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(task["position"], 1000);
    }

    #[tokio::test]
    async fn test_out_of_range_positions_are_rejected() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let a = add_task(&ctx, &b, "A").await;

        for position in [0, -1, i64::MAX] {
            let result = ReorderTasks::new(
                "acme",
                "alice",
                b.project_id.as_str(),
                vec![ReorderItem::new(a.as_str(), position)],
            )
            .execute(&ctx)
            .await;
            assert!(matches!(result, Err(TrackerError::InvalidArgument { .. })));
        }
    }

    #[tokio::test]
    async fn test_append_after_ceiling_respaces_column() {
        let (_temp, ctx) = setup();
        let b = board(&ctx).await;
        let a = add_task(&ctx, &b, "A").await;

        ReorderTasks::new(
            "acme",
            "alice",
            b.project_id.as_str(),
            vec![ReorderItem::new(a.as_str(), MAX_POSITION)],
        )
        .execute(&ctx)
        .await
        .unwrap();

        let added = crate::task::AddTask::new("acme", "alice", b.project_id.as_str(), "B")
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(added["position"], 2000);
        assert_eq!(titles(&ctx, &b).await, vec!["A", "B"]);

        let task = crate::task::GetTask::new("acme", a.as_str())
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(task["position"], 1000);
    }
}
