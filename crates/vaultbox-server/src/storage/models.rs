//! Data models for `VaultBox` storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub last_active: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Instant inactivity is measured from. Accounts that never recorded
    /// activity count from registration.
    pub fn activity_reference(&self) -> i64 {
        self.last_active.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrustedContact {
    pub id: String,
    pub user_id: String,
    pub contact_email: String,
    pub unlock_after_days: i64,
    pub last_requested_at: Option<i64>,
    pub is_unlock_active: bool,
    #[serde(skip_serializing)]
    pub last_status_notice_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Trusted-contact row joined with the owning user's columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactWithOwner {
    #[sqlx(flatten)]
    pub contact: TrustedContact,
    pub owner_email: String,
    pub owner_last_active: Option<i64>,
    pub owner_created_at: i64,
}

impl ContactWithOwner {
    pub fn owner_activity_reference(&self) -> i64 {
        self.owner_last_active.unwrap_or(self.owner_created_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EntryCategory {
    Finance,
    Health,
    Personal,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum Visibility {
    #[default]
    Private,
    Shared,
    UnlockAfter,
}

impl Visibility {
    /// Visibilities a trusted contact may see once their access is unlocked.
    pub const SHAREABLE: [Self; 2] = [Self::Shared, Self::UnlockAfter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Shared => "Shared",
            Self::UnlockAfter => "UnlockAfter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VaultEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub category: EntryCategory,
    pub encrypted_content: String,
    pub content_type: ContentType,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_mime_type: Option<String>,
    pub visibility: Visibility,
    pub auto_delete_at: Option<i64>,
    pub unlock_after: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl VaultEntry {
    /// File metadata, present only when all three columns are set.
    pub fn file(&self) -> Option<FileMeta> {
        match (&self.file_name, self.file_size, &self.file_mime_type) {
            (Some(name), Some(size), Some(mime_type)) => Some(FileMeta {
                name: name.clone(),
                size,
                mime_type: mime_type.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    AccessRequest,
    AccessGranted,
    TrustedContactAdded,
    InactivityWarning,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Option<String>,
    pub is_read: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
