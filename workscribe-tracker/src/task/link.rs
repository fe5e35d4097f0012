//! LinkPage and UnlinkPage commands

use super::task_resource;
use crate::activity;
use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActivityAction, ActorId, NewActivity, OrgId, PageId, TaskId, TaskPageLink};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

/// Link a task to a wiki page of the same organization
#[derive(Debug, Clone, Deserialize)]
pub struct LinkPage {
    pub org: OrgId,
    pub actor: ActorId,
    pub task_id: TaskId,
    pub page_id: PageId,
}

operation!(
    LinkPage,
    verb = "link",
    noun = "page",
    description = "Link a task to a wiki page"
);

impl LinkPage {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        task_id: impl Into<TaskId>,
        page_id: impl Into<PageId>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            task_id: task_id.into(),
            page_id: page_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for LinkPage {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let link = ctx
            .db()
            .write(task_resource(&self.task_id), move |tx| {
                let task = store::get_task(tx, &cmd.org, &cmd.task_id)?;
                let page = store::get_page(tx, &cmd.org, &cmd.page_id)?;
                let link = TaskPageLink {
                    task_id: task.id,
                    page_id: page.id,
                    created_by: cmd.actor.clone(),
                    created_at: Utc::now(),
                };
                store::insert_link(tx, &link)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_task(&cmd.org, &link.task_id, &cmd.actor, ActivityAction::DocLinked)
                        .with_new(json!({ "page_id": link.page_id, "title": page.title })),
                )?;
                Ok(link)
            })
            .await?;
        Ok(serde_json::to_value(&link)?)
    }
}

/// Remove a task-page link
#[derive(Debug, Clone, Deserialize)]
pub struct UnlinkPage {
    pub org: OrgId,
    pub actor: ActorId,
    pub task_id: TaskId,
    pub page_id: PageId,
}

operation!(
    UnlinkPage,
    verb = "unlink",
    noun = "page",
    description = "Remove a link between a task and a wiki page"
);

impl UnlinkPage {
    pub fn new(
        org: impl Into<OrgId>,
        actor: impl Into<ActorId>,
        task_id: impl Into<TaskId>,
        page_id: impl Into<PageId>,
    ) -> Self {
        Self {
            org: org.into(),
            actor: actor.into(),
            task_id: task_id.into(),
            page_id: page_id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for UnlinkPage {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        ctx.db()
            .write(task_resource(&self.task_id), move |tx| {
                let task = store::get_task(tx, &cmd.org, &cmd.task_id)?;
                store::delete_link(tx, &task.id, &cmd.page_id)?;
                activity::log_activity(
                    tx,
                    NewActivity::for_task(&cmd.org, &task.id, &cmd.actor, ActivityAction::DocUnlinked)
                        .with_old(json!({ "page_id": cmd.page_id })),
                )?;
                Ok(())
            })
            .await?;
        Ok(json!({ "task_id": self.task_id, "page_id": self.page_id, "unlinked": true }))
    }
}
