//! `VaultService`: CRUD over an owner's entries plus expiry purging.

use tracing::{info, instrument};
use vaultbox_core::db::unix_timestamp;

use crate::storage::{ContentType, FileMeta, NewVaultEntry, VaultDatabase};

use super::VaultError;
use super::types::{EntryChanges, EntryView, NewEntry};

#[derive(Clone)]
pub struct VaultService {
    db: VaultDatabase,
}

impl VaultService {
    pub const fn new(db: VaultDatabase) -> Self {
        Self { db }
    }

    #[instrument(skip(self, entry), fields(title = %entry.title))]
    pub async fn create(&self, owner_id: &str, entry: NewEntry) -> Result<EntryView, VaultError> {
        validate_title(&entry.title)?;
        let content_type = resolve_content_type(entry.content_type, entry.file.as_ref())?;
        if let Some(at) = entry.auto_delete_date {
            validate_auto_delete(at)?;
        }

        let id = uuid::Uuid::new_v4().to_string();
        let stored = self
            .db
            .insert_vault_entry(&NewVaultEntry {
                id: &id,
                user_id: owner_id,
                title: &entry.title,
                category: entry.category,
                encrypted_content: &entry.content,
                content_type,
                file: entry.file.as_ref(),
                visibility: entry.visibility,
                auto_delete_at: entry.auto_delete_date,
                unlock_after: entry.unlock_after,
            })
            .await?;

        info!(entry_id = %id, visibility = stored.visibility.as_str(), "Vault entry created");
        Ok(stored.into())
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<EntryView>, VaultError> {
        let entries = self.db.list_vault_entries(owner_id).await?;
        Ok(entries.into_iter().map(EntryView::from).collect())
    }

    pub async fn get(&self, owner_id: &str, id: &str) -> Result<EntryView, VaultError> {
        Ok(self.db.get_vault_entry(owner_id, id).await?.into())
    }

    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        owner_id: &str,
        id: &str,
        changes: EntryChanges,
    ) -> Result<EntryView, VaultError> {
        let mut entry = self.db.get_vault_entry(owner_id, id).await?;

        if let Some(title) = changes.title {
            validate_title(&title)?;
            entry.title = title;
        }
        if let Some(category) = changes.category {
            entry.category = category;
        }
        if let Some(content) = changes.content {
            entry.encrypted_content = content;
        }
        if let Some(file) = changes.file {
            entry.content_type = ContentType::File;
            entry.file_name = Some(file.name);
            entry.file_size = Some(file.size);
            entry.file_mime_type = Some(file.mime_type);
        }
        match changes.content_type {
            Some(ContentType::Text) => {
                entry.content_type = ContentType::Text;
                entry.file_name = None;
                entry.file_size = None;
                entry.file_mime_type = None;
            }
            Some(ContentType::File) => {
                entry.content_type = resolve_content_type(ContentType::File, entry.file().as_ref())?;
            }
            None => {}
        }
        if let Some(visibility) = changes.visibility {
            entry.visibility = visibility;
        }
        if let Some(at) = changes.auto_delete_date {
            validate_auto_delete(at)?;
            entry.auto_delete_at = Some(at);
        }
        if let Some(at) = changes.unlock_after {
            entry.unlock_after = Some(at);
        }

        Ok(self.db.update_vault_entry(&entry).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, owner_id: &str, id: &str) -> Result<(), VaultError> {
        if self.db.delete_vault_entry(owner_id, id).await? {
            info!("Vault entry deleted");
            Ok(())
        } else {
            Err(VaultError::NotFound(format!("Vault entry {id}")))
        }
    }

    /// Delete every entry whose auto-delete instant is at or before `now`.
    pub async fn purge_expired(&self, now: i64) -> Result<u64, VaultError> {
        let removed = self.db.delete_expired_entries(now).await?;
        if removed > 0 {
            info!(removed, "Purged expired vault entries");
        }
        Ok(removed)
    }
}

fn validate_title(title: &str) -> Result<(), VaultError> {
    if title.trim().is_empty() {
        return Err(VaultError::Validation("Title must not be empty".into()));
    }
    Ok(())
}

fn validate_auto_delete(at: i64) -> Result<(), VaultError> {
    if at <= unix_timestamp() {
        return Err(VaultError::Validation(
            "Auto-delete date must be in the future".into(),
        ));
    }
    Ok(())
}

/// File entries need metadata; a file attachment always means a file entry.
fn resolve_content_type(
    requested: ContentType,
    file: Option<&FileMeta>,
) -> Result<ContentType, VaultError> {
    match (requested, file) {
        (_, Some(_)) => Ok(ContentType::File),
        (ContentType::File, None) => Err(VaultError::Validation(
            "File entries require file metadata".into(),
        )),
        (ContentType::Text, None) => Ok(ContentType::Text),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{EntryCategory, Visibility};

    async fn setup() -> VaultService {
        let db = VaultDatabase::open_in_memory().await.unwrap();
        db.create_user("owner", "alice@example.com", "h").await.unwrap();
        db.create_user("other", "bob@example.com", "h").await.unwrap();
        VaultService::new(db)
    }

    fn text_entry(title: &str) -> NewEntry {
        NewEntry {
            title: title.into(),
            category: EntryCategory::Finance,
            content: "Y2lwaGVydGV4dA==".into(),
            content_type: ContentType::Text,
            file: None,
            visibility: Visibility::Private,
            auto_delete_date: None,
            unlock_after: None,
        }
    }

    #[tokio::test]
    async fn create_then_get_passes_content_through() {
        let svc = setup().await;
        let created = svc.create("owner", text_entry("Bank")).await.unwrap();

        let fetched = svc.get("owner", &created.id).await.unwrap();
        assert_eq!(fetched.encrypted_content, "Y2lwaGVydGV4dA==");
        assert_eq!(fetched.content_type, ContentType::Text);
        assert!(fetched.file.is_none());
    }

    #[tokio::test]
    async fn entries_are_private_to_their_owner() {
        let svc = setup().await;
        let created = svc.create("owner", text_entry("Bank")).await.unwrap();

        assert!(matches!(
            svc.get("other", &created.id).await,
            Err(VaultError::NotFound(_))
        ));
        assert!(svc.list("other").await.unwrap().is_empty());
        assert!(matches!(
            svc.delete("other", &created.id).await,
            Err(VaultError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_blank_title_and_file_without_metadata() {
        let svc = setup().await;
        assert!(matches!(
            svc.create("owner", text_entry("  ")).await,
            Err(VaultError::Validation(_))
        ));

        let mut file_entry = text_entry("Will");
        file_entry.content_type = ContentType::File;
        assert!(matches!(
            svc.create("owner", file_entry).await,
            Err(VaultError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn rejects_auto_delete_in_the_past() {
        let svc = setup().await;
        let mut entry = text_entry("Old");
        entry.auto_delete_date = Some(unix_timestamp() - 60);
        assert!(matches!(
            svc.create("owner", entry).await,
            Err(VaultError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn partial_update_keeps_unspecified_fields() {
        let svc = setup().await;
        let created = svc.create("owner", text_entry("Bank")).await.unwrap();

        let updated = svc
            .update(
                "owner",
                &created.id,
                EntryChanges {
                    visibility: Some(Visibility::Shared),
                    ..EntryChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.visibility, Visibility::Shared);
        assert_eq!(updated.title, "Bank");
        assert_eq!(updated.category, EntryCategory::Finance);
    }

    #[tokio::test]
    async fn attaching_a_file_switches_content_type() {
        let svc = setup().await;
        let created = svc.create("owner", text_entry("Deed")).await.unwrap();

        let updated = svc
            .update(
                "owner",
                &created.id,
                EntryChanges {
                    file: Some(FileMeta {
                        name: "deed.pdf".into(),
                        size: 10,
                        mime_type: "application/pdf".into(),
                    }),
                    ..EntryChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content_type, ContentType::File);
        assert_eq!(updated.file.unwrap().name, "deed.pdf");
    }

    #[tokio::test]
    async fn purge_removes_only_expired() {
        let svc = setup().await;
        let mut soon = text_entry("Soon");
        soon.auto_delete_date = Some(unix_timestamp() + 60);
        svc.create("owner", soon).await.unwrap();
        svc.create("owner", text_entry("Forever")).await.unwrap();

        assert_eq!(svc.purge_expired(unix_timestamp()).await.unwrap(), 0);
        assert_eq!(svc.purge_expired(unix_timestamp() + 120).await.unwrap(), 1);
        assert_eq!(svc.list("owner").await.unwrap().len(), 1);
    }
}
