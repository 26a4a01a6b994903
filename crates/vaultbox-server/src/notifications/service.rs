//! `NotificationService`: typed constructors over the notification log.

use serde_json::json;
use tracing::{debug, instrument};

use crate::storage::{NewNotification, Notification, NotificationKind, VaultDatabase};

use super::NotificationError;

#[derive(Clone)]
pub struct NotificationService {
    db: VaultDatabase,
}

impl NotificationService {
    pub const fn new(db: VaultDatabase) -> Self {
        Self { db }
    }

    /// Tell an owner that their trusted contact asked for access.
    pub async fn access_requested(
        &self,
        owner_id: &str,
        contact_email: &str,
    ) -> Result<Notification, NotificationError> {
        self.append(
            owner_id,
            NotificationKind::AccessRequest,
            "Emergency Access Request",
            &format!(
                "Your trusted contact ({contact_email}) has requested emergency access to your vault."
            ),
            Some(json!({ "contactEmail": contact_email })),
        )
        .await
    }

    /// Tell a contact that an owner's vault is now open to them.
    pub async fn access_granted(
        &self,
        contact_user_id: &str,
        owner_email: &str,
    ) -> Result<Notification, NotificationError> {
        self.append(
            contact_user_id,
            NotificationKind::AccessGranted,
            "Emergency Access Granted",
            &format!("You have been granted emergency access to {owner_email}'s vault."),
            Some(json!({ "vaultOwnerEmail": owner_email })),
        )
        .await
    }

    /// Tell a user they were named as someone's trusted contact.
    pub async fn trusted_contact_added(
        &self,
        contact_user_id: &str,
        owner_email: &str,
    ) -> Result<Notification, NotificationError> {
        self.append(
            contact_user_id,
            NotificationKind::TrustedContactAdded,
            "Added as Trusted Contact",
            &format!(
                "{owner_email} has added you as their trusted contact for emergency vault access."
            ),
            Some(json!({ "vaultOwnerEmail": owner_email })),
        )
        .await
    }

    pub async fn inactivity_warning(
        &self,
        owner_id: &str,
    ) -> Result<Notification, NotificationError> {
        self.append(
            owner_id,
            NotificationKind::InactivityWarning,
            "Inactivity Warning",
            "Your vault has been inactive. Your trusted contact has been granted emergency access.",
            None,
        )
        .await
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.db.list_notifications(user_id).await?)
    }

    /// Mark one notification read. Notifications belonging to another user
    /// are reported as missing.
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<(), NotificationError> {
        if self.db.mark_notification_read(id, user_id).await? {
            Ok(())
        } else {
            Err(NotificationError::NotFound(id.to_string()))
        }
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, NotificationError> {
        let changed = self.db.mark_all_notifications_read(user_id).await?;
        debug!(changed, "Notifications marked read");
        Ok(changed)
    }

    async fn append(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) -> Result<Notification, NotificationError> {
        let data = data.map(|d| serde_json::to_string(&d)).transpose()?;
        let id = uuid::Uuid::new_v4().to_string();

        let notification = self
            .db
            .insert_notification(&NewNotification {
                id: &id,
                user_id,
                kind,
                title,
                message,
                data: data.as_deref(),
            })
            .await?;

        debug!(user_id, kind = ?kind, "Notification appended");
        Ok(notification)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn setup() -> NotificationService {
        let db = VaultDatabase::open_in_memory().await.unwrap();
        db.create_user("owner", "alice@example.com", "h").await.unwrap();
        db.create_user("contact", "bob@example.com", "h").await.unwrap();
        NotificationService::new(db)
    }

    #[tokio::test]
    async fn access_request_carries_contact_email() {
        let svc = setup().await;
        let n = svc
            .access_requested("owner", "bob@example.com")
            .await
            .unwrap();

        assert_eq!(n.kind, NotificationKind::AccessRequest);
        assert_eq!(n.title, "Emergency Access Request");
        assert!(n.message.contains("bob@example.com"));
        let data: serde_json::Value = serde_json::from_str(n.data.as_deref().unwrap()).unwrap();
        assert_eq!(data["contactEmail"], "bob@example.com");
    }

    #[tokio::test]
    async fn inactivity_warning_has_no_data() {
        let svc = setup().await;
        let n = svc.inactivity_warning("owner").await.unwrap();
        assert_eq!(n.kind, NotificationKind::InactivityWarning);
        assert!(n.data.is_none());
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_owner() {
        let svc = setup().await;
        let n = svc
            .access_granted("contact", "alice@example.com")
            .await
            .unwrap();

        let err = svc.mark_read(&n.id, "owner").await.unwrap_err();
        assert!(matches!(err, NotificationError::NotFound(_)));

        svc.mark_read(&n.id, "contact").await.unwrap();
        assert!(svc.list("contact").await.unwrap()[0].is_read);
    }

    #[tokio::test]
    async fn mark_all_read_counts_changes() {
        let svc = setup().await;
        svc.trusted_contact_added("contact", "alice@example.com")
            .await
            .unwrap();
        svc.access_granted("contact", "alice@example.com")
            .await
            .unwrap();

        assert_eq!(svc.mark_all_read("contact").await.unwrap(), 2);
        assert!(svc.list("contact").await.unwrap().iter().all(|n| n.is_read));
        assert!(svc.list("owner").await.unwrap().is_empty());
    }
}
