use crate::error::{Result, TrackerError};
use crate::types::{
    ActorId, EntityKind, NewNotification, Notification, NotificationId, NotificationPage, OrgId,
};
use chrono::Utc;
use rusqlite::{params, Connection, Row};

const NOTIFICATION_COLUMNS: &str = "id, org_id, recipient_id, type, title, body, entity_type, \
     entity_id, is_read, created_at";

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        org_id: row.get(1)?,
        recipient_id: row.get(2)?,
        notification_type: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        entity_type: row.get(6)?,
        entity_id: row.get(7)?,
        is_read: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub(crate) fn insert_notification(
    conn: &Connection,
    new: NewNotification,
) -> Result<Notification> {
    let notification = Notification {
        id: NotificationId::new(),
        org_id: new.org_id,
        recipient_id: new.recipient_id,
        notification_type: new.notification_type,
        title: new.title,
        body: new.body,
        entity_type: new.entity_type,
        entity_id: new.entity_id,
        is_read: false,
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO notifications (id, org_id, recipient_id, type, title, body, entity_type, \
         entity_id, is_read, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
        params![
            notification.id,
            notification.org_id,
            notification.recipient_id,
            notification.notification_type,
            notification.title,
            notification.body,
            notification.entity_type,
            notification.entity_id,
            notification.created_at
        ],
    )?;
    Ok(notification)
}

/// A recipient's notifications, newest first
pub(crate) fn list_notifications(
    conn: &Connection,
    org: &OrgId,
    recipient: &ActorId,
    unread_only: bool,
    skip: usize,
    limit: usize,
) -> Result<NotificationPage> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
         WHERE org_id = ?1 AND recipient_id = ?2 AND (?3 = 0 OR is_read = 0) \
         ORDER BY created_at DESC, id DESC LIMIT ?4 OFFSET ?5"
    ))?;
    let notifications = stmt
        .query_map(
            params![org, recipient, unread_only, limit as i64, skip as i64],
            row_to_notification,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let (total, unread_count): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_read = 0 THEN 1 ELSE 0 END), 0) \
         FROM notifications WHERE org_id = ?1 AND recipient_id = ?2 AND (?3 = 0 OR is_read = 0)",
        params![org, recipient, unread_only],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(NotificationPage {
        notifications,
        total,
        unread_count,
    })
}

/// Flip one notification to read. Scoped to the recipient.
pub(crate) fn mark_read(
    conn: &Connection,
    org: &OrgId,
    recipient: &ActorId,
    id: &NotificationId,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND org_id = ?2 AND recipient_id = ?3",
        params![id, org, recipient],
    )?;
    if updated == 0 {
        return Err(TrackerError::not_found(EntityKind::Notification, id));
    }
    Ok(())
}

/// Mark every unread notification of a recipient read; returns how many changed
pub(crate) fn mark_all_read(conn: &Connection, org: &OrgId, recipient: &ActorId) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE org_id = ?1 AND recipient_id = ?2 AND is_read = 0",
        params![org, recipient],
    )?;
    Ok(updated)
}
