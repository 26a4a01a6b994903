//! Notification log queries.
//!
//! The log is append-only; the only mutation is the read flag.

use vaultbox_core::db::{DatabaseError, unix_timestamp};

use super::db::VaultDatabase;
use super::models::{Notification, NotificationKind};

/// Parameters for appending a notification.
pub struct NewNotification<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub kind: NotificationKind,
    pub title: &'a str,
    pub message: &'a str,
    /// Structured payload, serialized JSON.
    pub data: Option<&'a str>,
}

impl VaultDatabase {
    /// Append a notification to a user's log.
    pub async fn insert_notification(
        &self,
        params: &NewNotification<'_>,
    ) -> Result<Notification, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, title, message, data, is_read, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(params.id)
        .bind(params.user_id)
        .bind(params.kind)
        .bind(params.title)
        .bind(params.message)
        .bind(params.data)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = ?")
            .bind(params.id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Notification {}", params.id)))
    }

    /// A user's notifications, newest first.
    pub async fn list_notifications(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications read. Returns `false` if the
    /// notification does not exist or belongs to someone else.
    pub async fn mark_notification_read(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(unix_timestamp())
        .bind(id)
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark all of a user's unread notifications read. Returns the count changed.
    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, updated_at = ? WHERE user_id = ? AND is_read = 0",
        )
        .bind(unix_timestamp())
        .bind(user_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }
}
