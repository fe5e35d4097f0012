//! MoveTask command

use super::task_resource;
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::notification::{done_notice, Notifier};
use crate::operation::{operation, Execute};
use crate::ordering::slot_of;
use crate::store;
use crate::types::{ActivityAction, ActorId, NewActivity, OrgId, StatusId, TaskId};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Move a task to a slot within its column or another column
#[derive(Debug, Clone, Deserialize)]
pub struct MoveTask {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: TaskId,
    /// Target column; the task's current column when absent
    pub status_id: Option<StatusId>,
    /// 0-based index among the target column's other tasks
    pub slot: usize,
}

operation!(
    MoveTask,
    verb = "move",
    noun = "task",
    description = "Move a task to a different column or position"
);

impl MoveTask {
    /// Move within the current column
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        id: impl Into<TaskId>,
        slot: usize,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
            status_id: None,
            slot,
        }
    }

    pub fn to_status(mut self, status_id: impl Into<StatusId>) -> Self {
        self.status_id = Some(status_id.into());
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for MoveTask {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let rules = ctx.ordering();
        let (task, notifications) = ctx
            .db()
            .write(task_resource(&self.id), move |tx| {
                let mut task = store::get_task(tx, &cmd.org, &cmd.id)?;
                let from = store::get_status(tx, &task.project_id, &task.status_id)?;
                let to = match &cmd.status_id {
                    Some(id) => store::get_status(tx, &task.project_id, id)?,
                    None => from.clone(),
                };
                let changes_column = to.id != from.id;

                if !changes_column {
                    let column = store::column_positions(tx, &to.id, None)?;
                    if slot_of(&column, &task.id) == Some(cmd.slot) {
                        debug!(task = %task.id, slot = cmd.slot, "task already in slot");
                        return Ok((task, Vec::new()));
                    }
                }

                let siblings = store::column_positions(tx, &to.id, Some(&task.id))?;
                let placement = rules.place(&siblings, cmd.slot)?;
                let now = Utc::now();
                if placement.was_rebalanced() {
                    debug!(column = %to.id, siblings = placement.rebalanced.len(), "rebalancing column");
                    for (sibling, position) in &placement.rebalanced {
                        store::set_task_position(tx, sibling, *position, now)?;
                    }
                }

                let old_position = task.position;
                task.status_id = to.id.clone();
                task.position = placement.position;
                task.updated_at = now;
                store::update_task(tx, &task)?;

                let entry = if changes_column {
                    NewActivity::field_change(
                        &task.org_id,
                        &task.id,
                        &cmd.actor,
                        "status_id",
                        json!(from.id),
                        json!(to.id),
                    )
                } else {
                    NewActivity::for_task(&task.org_id, &task.id, &cmd.actor, ActivityAction::TaskMoved)
                        .with_old(json!({ "position": old_position }))
                        .with_new(json!({ "position": task.position }))
                };
                activity::log_activity(tx, entry)?;

                let notices = if to.is_done() && !from.is_done() {
                    done_notice(&task, &cmd.actor)
                } else {
                    None
                };
                let notifications = Notifier::record_all(tx, notices)?;
                Ok((task, notifications))
            })
            .await?;

        ctx.notifier().push_all(&notifications);
        Ok(serde_json::to_value(&task)?)
    }
}
