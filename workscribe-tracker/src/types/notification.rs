//! Notification types

use super::ids::{ActorId, NotificationId, OrgId};
use super::project::EntityKind;
use super::sql::text_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    TaskAssigned,
    Mention,
    TaskDone,
}

text_enum!(NotificationType {
    TaskAssigned => "TASK_ASSIGNED",
    Mention => "MENTION",
    TaskDone => "TASK_DONE",
});

/// A persisted notification for one recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub org_id: OrgId,
    pub recipient_id: ActorId,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload of a notification to dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub org_id: OrgId,
    pub recipient_id: ActorId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: Option<String>,
    pub entity_type: EntityKind,
    pub entity_id: String,
}

impl NewNotification {
    pub fn new(
        org_id: &OrgId,
        recipient_id: &ActorId,
        notification_type: NotificationType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.clone(),
            recipient_id: recipient_id.clone(),
            notification_type,
            title: title.into(),
            body: None,
            entity_type: EntityKind::Task,
            entity_id: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn about(mut self, entity_type: EntityKind, entity_id: impl ToString) -> Self {
        self.entity_type = entity_type;
        self.entity_id = entity_id.to_string();
        self
    }
}

/// One page of a recipient's notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: i64,
    pub unread_count: i64,
}
