//! CompleteSprint command

use super::{ensure_transition, sprint_resource};
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{
    ActivityAction, ActorId, Disposition, EntityKind, NewActivity, OrgId, Sprint, SprintId,
    SprintStatus, TaskId,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Complete an active sprint, sending its unfinished tasks to the backlog
/// or to another planned sprint
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteSprint {
    pub org: OrgId,
    pub actor: ActorId,
    pub id: SprintId,
    pub disposition: Disposition,
}

operation!(
    CompleteSprint,
    verb = "complete",
    noun = "sprint",
    description = "Complete the active sprint and redistribute unfinished tasks"
);

#[derive(Debug, Serialize)]
struct Completion {
    sprint: Sprint,
    disposition: Disposition,
    moved_tasks: Vec<TaskId>,
}

impl CompleteSprint {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        id: impl Into<SprintId>,
        disposition: Disposition,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            id: id.into(),
            disposition,
        }
    }
}

/// The sprint that receives unfinished tasks, checked against `from`
fn receiving_sprint(
    conn: &Connection,
    org: &OrgId,
    from: &Sprint,
    target: &SprintId,
) -> Result<Sprint> {
    if *target == from.id {
        return Err(TrackerError::invalid_argument(
            "disposition.target",
            "cannot move tasks into the sprint being completed",
        ));
    }
    let target = store::get_sprint(conn, org, target)?;
    if target.project_id != from.project_id {
        return Err(TrackerError::invalid_argument(
            "disposition.target",
            "target sprint belongs to another project",
        ));
    }
    if target.status != SprintStatus::Planned {
        return Err(TrackerError::conflict(
            EntityKind::Sprint,
            &target.id,
            format!("target sprint is {}, not planned", target.status),
        ));
    }
    Ok(target)
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for CompleteSprint {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let completion = ctx
            .db()
            .write(sprint_resource(&self.id), move |tx| {
                let mut sprint = store::get_sprint(tx, &cmd.org, &cmd.id)?;
                ensure_transition(&sprint, SprintStatus::Completed)?;

                let destination = match cmd.disposition.destination() {
                    Some(target) => Some(receiving_sprint(tx, &cmd.org, &sprint, target)?.id),
                    None => None,
                };

                let now = Utc::now();
                let moved = store::incomplete_in_sprint(tx, &sprint.id)?;
                for task_id in &moved {
                    store::set_task_sprint(tx, task_id, destination.as_ref(), now)?;
                    activity::log_activity(
                        tx,
                        NewActivity::field_change(
                            &cmd.org,
                            task_id,
                            &cmd.actor,
                            "sprint_id",
                            json!(sprint.id),
                            json!(destination),
                        ),
                    )?;
                }

                store::set_sprint_status(tx, &sprint, SprintStatus::Completed, now)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_entity(
                        &cmd.org,
                        &cmd.actor,
                        ActivityAction::SprintCompleted,
                        EntityKind::Sprint,
                        &sprint.id,
                    )
                    .with_old(json!({ "status": sprint.status }))
                    .with_new(json!({
                        "status": SprintStatus::Completed,
                        "disposition": cmd.disposition,
                        "moved_tasks": moved.len(),
                    })),
                )?;

                sprint.status = SprintStatus::Completed;
                sprint.updated_at = now;
                Ok(Completion {
                    sprint,
                    disposition: cmd.disposition,
                    moved_tasks: moved,
                })
            })
            .await?;

        info!(
            sprint = %completion.sprint.id,
            moved = completion.moved_tasks.len(),
            "sprint completed"
        );
        Ok(serde_json::to_value(&completion)?)
    }
}
