//! ListNotifications command

use crate::context::TrackerContext;
use crate::error::{Result, TrackerError};
use crate::operation::{operation, Execute};
use crate::store;
use crate::types::{ActorId, OrgId};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_LIMIT: usize = 50;

/// List a recipient's notifications, newest first
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotifications {
    pub org: OrgId,
    pub recipient: ActorId,
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

operation!(
    ListNotifications,
    verb = "list",
    noun = "notifications",
    description = "List notifications for a recipient"
);

impl ListNotifications {
    pub fn new(org: impl Into<OrgId>, recipient: impl Into<ActorId>) -> Self {
        Self {
            org: org.into(),
            recipient: recipient.into(),
            unread_only: false,
            skip: 0,
            limit: None,
        }
    }

    pub fn unread_only(mut self) -> Self {
        self.unread_only = true;
        self
    }

    pub fn with_page(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
impl Execute<TrackerContext, TrackerError> for ListNotifications {
    async fn execute(&self, ctx: &TrackerContext) -> Result<Value> {
        let cmd = self.clone();
        let page = ctx
            .db()
            .read(move |conn| {
                store::list_notifications(
                    conn,
                    &cmd.org,
                    &cmd.recipient,
                    cmd.unread_only,
                    cmd.skip,
                    cmd.limit.unwrap_or(DEFAULT_LIMIT),
                )
            })
            .await?;
        Ok(serde_json::to_value(page)?)
    }
}
