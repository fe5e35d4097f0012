//! Notification dispatch and read-side commands
//!
//! Dispatch is two steps. The row is persisted first, normally inside the
//! transaction of the mutation that triggered it, so a rolled-back mutation
//! never leaves a notification behind. After commit the notification is
//! pushed to the recipient's live channel if there is one. A failed push is
//! never an error; the row stays unread for the next poll.

mod list;
mod mark_read;
mod registry;
mod triggers;

pub use list::ListNotifications;
pub use mark_read::{MarkAllNotificationsRead, MarkNotificationRead};
pub use registry::{ConnectionRegistry, PushOutcome};
pub(crate) use triggers::{assignment_notice, done_notice, mention_notices};

use crate::error::Result;
use crate::store::{self, Database};
use crate::types::{ActorId, NewNotification, Notification};
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Persists notifications and pushes them to live channels
#[derive(Debug, Clone)]
pub struct Notifier {
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new(channel_capacity)),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Register a live channel for `recipient`
    pub fn connect(&self, recipient: impl Into<ActorId>) -> mpsc::Receiver<Notification> {
        self.registry.connect(recipient.into())
    }

    pub fn disconnect(&self, recipient: &ActorId) -> bool {
        self.registry.disconnect(recipient)
    }

    /// Persist inside the caller's transaction. Push after commit with
    /// [`Notifier::push_all`].
    pub fn record(conn: &Connection, new: NewNotification) -> Result<Notification> {
        let notification = store::insert_notification(conn, new)?;
        debug!(
            recipient = %notification.recipient_id,
            kind = %notification.notification_type,
            notification = %notification.id,
            "notification recorded"
        );
        Ok(notification)
    }

    pub fn record_all(
        conn: &Connection,
        notices: impl IntoIterator<Item = NewNotification>,
    ) -> Result<Vec<Notification>> {
        notices
            .into_iter()
            .map(|notice| Self::record(conn, notice))
            .collect()
    }

    /// Best-effort push of committed notifications
    pub fn push_all(&self, notifications: &[Notification]) {
        for notification in notifications {
            let outcome = self.registry.push(notification);
            debug!(
                recipient = %notification.recipient_id,
                notification = %notification.id,
                ?outcome,
                "notification push"
            );
        }
    }

    /// Persist a notification in its own write, then push it
    pub async fn notify(&self, db: &Database, new: NewNotification) -> Result<Notification> {
        let resource = format!("notifications for {}", new.recipient_id);
        let notification = db
            .write(resource, move |tx| Self::record(tx, new))
            .await?;
        self.push_all(std::slice::from_ref(&notification));
        Ok(notification)
    }
}
