//! Read-state commands

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActorId, NotificationId, OrgId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Mark one of the recipient's notifications read
#[derive(Debug, Clone, Deserialize)]
pub struct MarkNotificationRead {
    pub org: OrgId,
    pub recipient: ActorId,
    pub id: NotificationId,
}

operation!(
    MarkNotificationRead,
    verb = "read",
    noun = "notification",
    description = "Mark a notification read"
);

impl MarkNotificationRead {
    pub fn new(
        org: impl Into<OrgId>,
        recipient: impl Into<ActorId>,
        id: impl Into<NotificationId>,
    ) -> Self {
        Self {
            org: org.into(),
            recipient: recipient.into(),
            id: id.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for MarkNotificationRead {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        ctx.db()
            .write(format!("notifications for {}", self.recipient), move |tx| {
                store::mark_read(tx, &cmd.org, &cmd.recipient, &cmd.id)
            })
            .await?;
        Ok(json!({ "id": self.id, "is_read": true }))
    }
}

/// Mark all of a recipient's notifications read
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAllNotificationsRead {
    pub org: OrgId,
    pub recipient: ActorId,
}

operation!(
    MarkAllNotificationsRead,
    verb = "read-all",
    noun = "notifications",
    description = "Mark every notification of a recipient read"
);

impl MarkAllNotificationsRead {
    pub fn new(org: impl Into<OrgId>, recipient: impl Into<ActorId>) -> Self {
        Self {
            org: org.into(),
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for MarkAllNotificationsRead {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let updated = ctx
            .db()
            .write(format!("notifications for {}", self.recipient), move |tx| {
                store::mark_all_read(tx, &cmd.org, &cmd.recipient)
            })
            .await?;
        Ok(json!({ "updated": updated }))
    }
}
