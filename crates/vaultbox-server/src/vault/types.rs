//! Request and response shapes for vault entries.

use serde::{Deserialize, Serialize};

use crate::storage::{ContentType, EntryCategory, FileMeta, VaultEntry, Visibility};

/// Fields for a new entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub title: String,
    pub category: EntryCategory,
    /// Client-encrypted payload.
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub file: Option<FileMeta>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub auto_delete_date: Option<i64>,
    #[serde(default)]
    pub unlock_after: Option<i64>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryChanges {
    pub title: Option<String>,
    pub category: Option<EntryCategory>,
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
    pub file: Option<FileMeta>,
    pub visibility: Option<Visibility>,
    pub auto_delete_date: Option<i64>,
    pub unlock_after: Option<i64>,
}

/// Wire form of a stored entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: String,
    pub title: String,
    pub category: EntryCategory,
    pub encrypted_content: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileMeta>,
    pub visibility: Visibility,
    pub auto_delete_date: Option<i64>,
    pub unlock_after: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<VaultEntry> for EntryView {
    fn from(entry: VaultEntry) -> Self {
        let file = entry.file();
        Self {
            id: entry.id,
            title: entry.title,
            category: entry.category,
            encrypted_content: entry.encrypted_content,
            content_type: entry.content_type,
            file,
            visibility: entry.visibility,
            auto_delete_date: entry.auto_delete_at,
            unlock_after: entry.unlock_after,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn auto_delete_date_is_read_from_requests() {
        let entry: NewEntry = serde_json::from_value(json!({
            "title": "t",
            "category": "NOTES",
            "content": "x",
            "autoDeleteDate": 1_999_999_999,
        }))
        .unwrap();
        assert_eq!(entry.auto_delete_date, Some(1_999_999_999));

        let changes: EntryChanges =
            serde_json::from_value(json!({ "autoDeleteDate": 2_000_000_000 })).unwrap();
        assert_eq!(changes.auto_delete_date, Some(2_000_000_000));
    }
}
