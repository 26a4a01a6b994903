//! Trusted contact queries.
//!
//! At most one row exists per owner (`user_id`) and per `contact_email`;
//! both are UNIQUE in the schema, so racing writers surface as
//! [`DatabaseError::Conflict`].

use vaultbox_core::db::{DatabaseError, unix_timestamp};

use super::db::VaultDatabase;
use super::models::{ContactWithOwner, TrustedContact};

const CONTACT_WITH_OWNER: &str = "SELECT tc.*, u.email AS owner_email, \
     u.last_active AS owner_last_active, u.created_at AS owner_created_at \
     FROM trusted_contacts tc JOIN users u ON u.id = tc.user_id";

impl VaultDatabase {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the trusted contact row for an owner.
    pub async fn insert_trusted_contact(
        &self,
        id: &str,
        user_id: &str,
        contact_email: &str,
        unlock_after_days: i64,
    ) -> Result<TrustedContact, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO trusted_contacts (id, user_id, contact_email, unlock_after_days, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(contact_email)
        .bind(unlock_after_days)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_trusted_contact(id).await
    }

    /// Get a trusted contact by ID.
    pub async fn get_trusted_contact(&self, id: &str) -> Result<TrustedContact, DatabaseError> {
        sqlx::query_as::<_, TrustedContact>("SELECT * FROM trusted_contacts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Trusted contact {id}")))
    }

    /// The owner's trusted contact, if any.
    pub async fn get_trusted_contact_by_owner(
        &self,
        user_id: &str,
    ) -> Result<Option<TrustedContact>, DatabaseError> {
        let contact =
            sqlx::query_as::<_, TrustedContact>("SELECT * FROM trusted_contacts WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;

        Ok(contact)
    }

    /// The row naming `contact_email`, whoever owns it.
    pub async fn get_trusted_contact_by_contact_email(
        &self,
        contact_email: &str,
    ) -> Result<Option<TrustedContact>, DatabaseError> {
        let contact = sqlx::query_as::<_, TrustedContact>(
            "SELECT * FROM trusted_contacts WHERE contact_email = ?",
        )
        .bind(contact_email)
        .fetch_optional(self.pool())
        .await?;

        Ok(contact)
    }

    /// The row pairing an owner with a specific contact email.
    pub async fn get_trusted_contact_for_pair(
        &self,
        user_id: &str,
        contact_email: &str,
    ) -> Result<Option<ContactWithOwner>, DatabaseError> {
        let sql = format!("{CONTACT_WITH_OWNER} WHERE tc.user_id = ? AND tc.contact_email = ?");
        let row = sqlx::query_as::<_, ContactWithOwner>(&sql)
            .bind(user_id)
            .bind(contact_email)
            .fetch_optional(self.pool())
            .await?;

        Ok(row)
    }

    /// The row pairing a requesting contact with an owner, looked up by the
    /// owner's email.
    pub async fn get_trusted_contact_for_request(
        &self,
        contact_email: &str,
        owner_email: &str,
    ) -> Result<Option<ContactWithOwner>, DatabaseError> {
        let sql = format!("{CONTACT_WITH_OWNER} WHERE tc.contact_email = ? AND u.email = ?");
        let row = sqlx::query_as::<_, ContactWithOwner>(&sql)
            .bind(contact_email)
            .bind(owner_email)
            .fetch_optional(self.pool())
            .await?;

        Ok(row)
    }

    /// Change the contact email and threshold.
    ///
    /// With `reset_access` the request/unlock state is cleared, which is
    /// what a change of contact person requires.
    pub async fn update_trusted_contact_settings(
        &self,
        id: &str,
        contact_email: &str,
        unlock_after_days: i64,
        reset_access: bool,
    ) -> Result<TrustedContact, DatabaseError> {
        let now = unix_timestamp();

        let result = if reset_access {
            sqlx::query(
                "UPDATE trusted_contacts SET contact_email = ?, unlock_after_days = ?, \
                 last_requested_at = NULL, is_unlock_active = 0, last_status_notice_at = NULL, \
                 updated_at = ? WHERE id = ?",
            )
            .bind(contact_email)
            .bind(unlock_after_days)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?
        } else {
            sqlx::query(
                "UPDATE trusted_contacts SET contact_email = ?, unlock_after_days = ?, updated_at = ? WHERE id = ?",
            )
            .bind(contact_email)
            .bind(unlock_after_days)
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Trusted contact {id}")));
        }
        self.get_trusted_contact(id).await
    }

    /// Delete the owner's trusted contact. Returns `false` if none existed.
    pub async fn delete_trusted_contact(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM trusted_contacts WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Access state
    // =========================================================================

    /// Stamp `last_requested_at`.
    pub async fn mark_access_requested(&self, id: &str, at: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE trusted_contacts SET last_requested_at = ?, updated_at = ? WHERE id = ?")
            .bind(at)
            .bind(unix_timestamp())
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Flip `is_unlock_active` to true.
    ///
    /// Returns `true` only for the caller that performed the transition;
    /// a row that was already unlocked is left untouched and yields `false`.
    pub async fn activate_unlock(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE trusted_contacts SET is_unlock_active = 1, updated_at = ? \
             WHERE id = ? AND is_unlock_active = 0",
        )
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record that a pending-status email went out.
    pub async fn mark_status_notice(&self, id: &str, at: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE trusted_contacts SET last_status_notice_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    // =========================================================================
    // Scans
    // =========================================================================

    /// All rows naming `contact_email`, with their owners.
    pub async fn list_contacts_of(
        &self,
        contact_email: &str,
    ) -> Result<Vec<ContactWithOwner>, DatabaseError> {
        let sql = format!("{CONTACT_WITH_OWNER} WHERE tc.contact_email = ? ORDER BY u.email");
        let rows = sqlx::query_as::<_, ContactWithOwner>(&sql)
            .bind(contact_email)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Rows whose owner has shown no activity since `cutoff`.
    pub async fn list_sweep_candidates(
        &self,
        cutoff: i64,
    ) -> Result<Vec<ContactWithOwner>, DatabaseError> {
        let sql =
            format!("{CONTACT_WITH_OWNER} WHERE COALESCE(u.last_active, u.created_at) < ?");
        let rows = sqlx::query_as::<_, ContactWithOwner>(&sql)
            .bind(cutoff)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    /// Rows with an outstanding access request that is not yet unlocked.
    pub async fn list_pending_requests(&self) -> Result<Vec<ContactWithOwner>, DatabaseError> {
        let sql = format!(
            "{CONTACT_WITH_OWNER} WHERE tc.is_unlock_active = 0 AND tc.last_requested_at IS NOT NULL"
        );
        let rows = sqlx::query_as::<_, ContactWithOwner>(&sql)
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }
}
