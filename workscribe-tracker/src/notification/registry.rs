//! Live connection registry
//!
//! Maps a recipient to at most one live channel. The registry is best effort
//! and never authoritative: the persisted notification row is the source of
//! truth and a missing or dead channel only means the recipient polls later.

use crate::types::{ActorId, Notification};
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Result of a best-effort push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Handed to the recipient's channel
    Delivered,
    /// Recipient has no live channel
    NotConnected,
    /// Channel buffer was full; the notification stays unread in the store
    Dropped,
    /// Channel had closed; its registry entry was removed
    Pruned,
}

#[derive(Debug)]
pub struct ConnectionRegistry {
    channels: DashMap<ActorId, mpsc::Sender<Notification>>,
    capacity: usize,
}

impl ConnectionRegistry {
    /// Registry whose channels buffer up to `capacity` notifications
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Register a live channel for `recipient`, replacing any previous one
    pub fn connect(&self, recipient: ActorId) -> mpsc::Receiver<Notification> {
        let (tx, rx) = mpsc::channel(self.capacity);
        if self.channels.insert(recipient.clone(), tx).is_some() {
            debug!(recipient = %recipient, "replaced live channel");
        } else {
            debug!(recipient = %recipient, "live channel connected");
        }
        rx
    }

    /// Drop the recipient's channel. Returns whether one was registered.
    pub fn disconnect(&self, recipient: &ActorId) -> bool {
        let removed = self.channels.remove(recipient).is_some();
        if removed {
            debug!(recipient = %recipient, "live channel disconnected");
        }
        removed
    }

    pub fn is_connected(&self, recipient: &ActorId) -> bool {
        self.channels
            .get(recipient)
            .map(|sender| !sender.is_closed())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Try to hand `notification` to its recipient's channel without waiting
    pub fn push(&self, notification: &Notification) -> PushOutcome {
        let recipient = &notification.recipient_id;
        // Clone the sender so no shard lock is held while sending or pruning
        let Some(sender) = self.channels.get(recipient).map(|entry| entry.clone()) else {
            return PushOutcome::NotConnected;
        };

        match sender.try_send(notification.clone()) {
            Ok(()) => PushOutcome::Delivered,
            Err(TrySendError::Full(_)) => {
                warn!(
                    recipient = %recipient,
                    notification = %notification.id,
                    "live channel full, notification left for polling"
                );
                PushOutcome::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                // A reconnect may have raced in; only prune a dead channel
                self.channels.remove_if(recipient, |_, s| s.is_closed());
                debug!(recipient = %recipient, "pruned closed live channel");
                PushOutcome::Pruned
            }
        }
    }
}
