//! Vault entry queries.

use vaultbox_core::db::{DatabaseError, unix_timestamp};

use super::db::VaultDatabase;
use super::models::{ContentType, EntryCategory, FileMeta, VaultEntry, Visibility};

/// Parameters for inserting a vault entry.
pub struct NewVaultEntry<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub category: EntryCategory,
    pub encrypted_content: &'a str,
    pub content_type: ContentType,
    pub file: Option<&'a FileMeta>,
    pub visibility: Visibility,
    pub auto_delete_at: Option<i64>,
    pub unlock_after: Option<i64>,
}

impl VaultDatabase {
    /// Insert a vault entry.
    pub async fn insert_vault_entry(
        &self,
        params: &NewVaultEntry<'_>,
    ) -> Result<VaultEntry, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO vault_entries (id, user_id, title, category, encrypted_content, content_type, \
             file_name, file_size, file_mime_type, visibility, auto_delete_at, unlock_after, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.id)
        .bind(params.user_id)
        .bind(params.title)
        .bind(params.category)
        .bind(params.encrypted_content)
        .bind(params.content_type)
        .bind(params.file.map(|f| f.name.as_str()))
        .bind(params.file.map(|f| f.size))
        .bind(params.file.map(|f| f.mime_type.as_str()))
        .bind(params.visibility)
        .bind(params.auto_delete_at)
        .bind(params.unlock_after)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_vault_entry(params.user_id, params.id).await
    }

    /// Get one of the owner's entries.
    pub async fn get_vault_entry(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<VaultEntry, DatabaseError> {
        sqlx::query_as::<_, VaultEntry>("SELECT * FROM vault_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Vault entry {id}")))
    }

    /// All of the owner's entries, newest first.
    pub async fn list_vault_entries(&self, user_id: &str) -> Result<Vec<VaultEntry>, DatabaseError> {
        let entries = sqlx::query_as::<_, VaultEntry>(
            "SELECT * FROM vault_entries WHERE user_id = ? ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// The owner's entries restricted to the given visibilities, newest first.
    pub async fn list_visible_entries(
        &self,
        user_id: &str,
        visibilities: &[Visibility],
    ) -> Result<Vec<VaultEntry>, DatabaseError> {
        if visibilities.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; visibilities.len()].join(", ");
        let sql = format!(
            "SELECT * FROM vault_entries WHERE user_id = ? AND visibility IN ({placeholders}) \
             ORDER BY created_at DESC, id"
        );
        let mut query = sqlx::query_as::<_, VaultEntry>(&sql).bind(user_id);
        for visibility in visibilities {
            query = query.bind(*visibility);
        }

        Ok(query.fetch_all(self.pool()).await?)
    }

    /// Persist every mutable column of an entry and bump `updated_at`.
    pub async fn update_vault_entry(&self, entry: &VaultEntry) -> Result<VaultEntry, DatabaseError> {
        let result = sqlx::query(
            "UPDATE vault_entries SET title = ?, category = ?, encrypted_content = ?, content_type = ?, \
             file_name = ?, file_size = ?, file_mime_type = ?, visibility = ?, auto_delete_at = ?, \
             unlock_after = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&entry.title)
        .bind(entry.category)
        .bind(&entry.encrypted_content)
        .bind(entry.content_type)
        .bind(&entry.file_name)
        .bind(entry.file_size)
        .bind(&entry.file_mime_type)
        .bind(entry.visibility)
        .bind(entry.auto_delete_at)
        .bind(entry.unlock_after)
        .bind(unix_timestamp())
        .bind(&entry.id)
        .bind(&entry.user_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Vault entry {}", entry.id)));
        }
        self.get_vault_entry(&entry.user_id, &entry.id).await
    }

    /// Delete one of the owner's entries. Returns `false` if it did not exist.
    pub async fn delete_vault_entry(&self, user_id: &str, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM vault_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry whose `auto_delete_at` is at or before `now`.
    /// Returns the count removed.
    pub async fn delete_expired_entries(&self, now: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM vault_entries WHERE auto_delete_at IS NOT NULL AND auto_delete_at <= ?",
        )
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }
}
