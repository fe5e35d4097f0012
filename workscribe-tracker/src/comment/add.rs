//! AddComment command

use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::notification::{mention_notices, Notifier};
use crate::operation::{operation, Execute};
use crate::store;
use crate::task::task_resource;
use crate::types::{ActivityAction, ActorId, Comment, CommentId, NewActivity, OrgId, TaskId};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

/// Comment on a task. `@actor` mentions notify the mentioned actors.
#[derive(Debug, Clone, Deserialize)]
pub struct AddComment {
    pub org: OrgId,
    pub actor: ActorId,
    pub task_id: TaskId,
    pub body: String,
}

operation!(
    AddComment,
    verb = "add",
    noun = "comment",
    description = "Add a comment to a task"
);

impl AddComment {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        task_id: impl Into<TaskId>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            task_id: task_id.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for AddComment {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Err(TrackerError::invalid_argument("body", "must not be empty"));
        }

        let cmd = self.clone();
        let (comment, notifications) = ctx
            .db()
            .write(task_resource(&self.task_id), move |tx| {
                let task = store::get_task(tx, &cmd.org, &cmd.task_id)?;
                let comment = Comment {
                    id: CommentId::new(),
                    task_id: task.id.clone(),
                    author_id: cmd.actor.clone(),
                    body: cmd.body,
                    created_at: Utc::now(),
                };
                store::insert_comment(tx, &comment)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_task(&task.org_id, &task.id, &comment.author_id, ActivityAction::CommentAdded)
                        .with_new(json!({ "comment_id": comment.id })),
                )?;
                let notifications = Notifier::record_all(tx, mention_notices(&task, &comment))?;
                Ok((comment, notifications))
            })
            .await?;

        ctx.notifier().push_all(&notifications);
        Ok(serde_json::to_value(&comment)?)
    }
}
