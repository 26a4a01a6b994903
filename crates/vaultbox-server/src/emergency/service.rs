//! `EmergencyAccessService`: trusted contact lifecycle, the access state
//! machine, the inactivity sweep, and the contact-facing read models.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use vaultbox_core::db::unix_timestamp;

use crate::email::{EmailKind, Mailer};
use crate::notifications::NotificationService;
use crate::storage::{ContactWithOwner, TrustedContact, VaultDatabase, Visibility};

use super::EmergencyAccessError;
use super::types::{
    AccessPolicy, AccessRequestOutcome, AccessSummary, SharedVaultEntry, SweepReport,
    VaultOwner, VaultOwnerAccess, inactive_days,
};

#[derive(Clone)]
pub struct EmergencyAccessService {
    db: VaultDatabase,
    notifications: NotificationService,
    mailer: Arc<dyn Mailer>,
    policy: AccessPolicy,
}

impl EmergencyAccessService {
    pub fn new(
        db: VaultDatabase,
        notifications: NotificationService,
        mailer: Arc<dyn Mailer>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            db,
            notifications,
            mailer,
            policy,
        }
    }

    pub const fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    // =========================================================================
    // Trusted contact lifecycle
    // =========================================================================

    pub async fn get_trusted_contact(
        &self,
        owner_id: &str,
    ) -> Result<Option<TrustedContact>, EmergencyAccessError> {
        Ok(self.db.get_trusted_contact_by_owner(owner_id).await?)
    }

    /// Designate `contact_email` as the owner's trusted contact.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        owner_id: &str,
        contact_email: &str,
        unlock_after_days: i64,
    ) -> Result<TrustedContact, EmergencyAccessError> {
        validate_unlock_after_days(unlock_after_days)?;
        let owner = self.db.get_user(owner_id).await?;
        let contact_user_id = self.resolve_contact(&owner.email, contact_email).await?;

        if self.db.get_trusted_contact_by_owner(owner_id).await?.is_some() {
            return Err(EmergencyAccessError::Conflict(
                "User already has a trusted contact".into(),
            ));
        }
        if self
            .db
            .get_trusted_contact_by_contact_email(contact_email)
            .await?
            .is_some()
        {
            return Err(EmergencyAccessError::Conflict(
                "This email is already registered as a trusted contact".into(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let contact = self
            .db
            .insert_trusted_contact(&id, owner_id, contact_email, unlock_after_days)
            .await?;

        self.announce_contact(&contact_user_id, contact_email, &owner.email)
            .await?;

        info!(contact_id = %contact.id, "Trusted contact designated");
        Ok(contact)
    }

    /// Change the owner's contact email and/or threshold.
    ///
    /// A new email gets the same checks as [`Self::create`] and starts from
    /// `NoRequest`.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        owner_id: &str,
        contact_email: &str,
        unlock_after_days: i64,
    ) -> Result<TrustedContact, EmergencyAccessError> {
        validate_unlock_after_days(unlock_after_days)?;
        let existing = self
            .db
            .get_trusted_contact_by_owner(owner_id)
            .await?
            .ok_or_else(|| EmergencyAccessError::NotFound("Trusted contact not found".into()))?;

        let email_changed = !existing.contact_email.eq_ignore_ascii_case(contact_email);
        let mut new_contact = None;
        if email_changed {
            let owner = self.db.get_user(owner_id).await?;
            let contact_user_id = self.resolve_contact(&owner.email, contact_email).await?;

            let taken = self
                .db
                .get_trusted_contact_by_contact_email(contact_email)
                .await?
                .is_some_and(|other| other.id != existing.id);
            if taken {
                return Err(EmergencyAccessError::Conflict(
                    "This email is already registered as a trusted contact".into(),
                ));
            }
            new_contact = Some((contact_user_id, owner.email));
        }

        let updated = self
            .db
            .update_trusted_contact_settings(
                &existing.id,
                contact_email,
                unlock_after_days,
                email_changed,
            )
            .await?;

        if let Some((contact_user_id, owner_email)) = new_contact {
            self.announce_contact(&contact_user_id, contact_email, &owner_email)
                .await?;
            info!(contact_id = %updated.id, "Trusted contact replaced");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, owner_id: &str) -> Result<(), EmergencyAccessError> {
        if !self.db.delete_trusted_contact(owner_id).await? {
            return Err(EmergencyAccessError::NotFound(
                "Trusted contact not found".into(),
            ));
        }
        info!("Trusted contact removed");
        Ok(())
    }

    // =========================================================================
    // Request / grant
    // =========================================================================

    /// A trusted contact asks for access to `owner_email`'s vault.
    ///
    /// Re-evaluates the owner's inactivity on every call. Access that is
    /// already granted stays granted.
    #[instrument(skip(self))]
    pub async fn request_access(
        &self,
        requester_email: &str,
        owner_email: &str,
    ) -> Result<AccessRequestOutcome, EmergencyAccessError> {
        let row = self
            .db
            .get_trusted_contact_for_request(requester_email, owner_email)
            .await?
            .ok_or_else(|| EmergencyAccessError::NotFound("Trusted contact not found".into()))?;

        let now = unix_timestamp();
        self.db.mark_access_requested(&row.contact.id, now).await?;

        if row.contact.is_unlock_active {
            debug!("Access already granted");
            return Ok(AccessRequestOutcome::Granted);
        }

        let inactive = inactive_days(now, row.owner_activity_reference());
        if inactive >= row.contact.unlock_after_days {
            if self.db.activate_unlock(&row.contact.id).await? {
                self.mailer
                    .send(
                        requester_email,
                        EmailKind::AccessGranted {
                            owner_email: row.owner_email.clone(),
                        },
                    )
                    .await?;
                info!(inactive_days = inactive, "Access granted on request");
            }
            return Ok(AccessRequestOutcome::Granted);
        }

        self.mailer
            .send(
                requester_email,
                EmailKind::AccessRequested {
                    owner_email: row.owner_email.clone(),
                },
            )
            .await?;
        self.notifications
            .access_requested(&row.contact.user_id, requester_email)
            .await?;

        info!(
            inactive_days = inactive,
            unlock_after_days = row.contact.unlock_after_days,
            "Access request pending"
        );
        Ok(AccessRequestOutcome::Pending {
            unlock_after_days: row.contact.unlock_after_days,
            inactive_days: inactive,
        })
    }

    /// The owner opens their vault to their contact directly.
    #[instrument(skip(self))]
    pub async fn grant_access(
        &self,
        owner_id: &str,
        contact_email: &str,
    ) -> Result<(), EmergencyAccessError> {
        let row = self
            .db
            .get_trusted_contact_for_pair(owner_id, contact_email)
            .await?
            .ok_or_else(|| EmergencyAccessError::NotFound("Trusted contact not found".into()))?;

        let transitioned = self.db.activate_unlock(&row.contact.id).await?;

        self.mailer
            .send(
                contact_email,
                EmailKind::AccessGranted {
                    owner_email: row.owner_email.clone(),
                },
            )
            .await?;
        match self.db.get_user_by_email(contact_email).await? {
            Some(contact_user) => {
                self.notifications
                    .access_granted(&contact_user.id, &row.owner_email)
                    .await?;
            }
            None => warn!("Trusted contact has no account; notification skipped"),
        }

        info!(transitioned, "Access granted by owner");
        Ok(())
    }

    // =========================================================================
    // Inactivity sweep
    // =========================================================================

    /// Grant access for owners inactive past their threshold and remind
    /// contacts whose requests are still pending.
    ///
    /// Rows are processed independently; a failing row is logged and
    /// counted in [`SweepReport::failures`].
    #[instrument(skip(self))]
    pub async fn check_inactive_users(
        &self,
        now: i64,
    ) -> Result<SweepReport, EmergencyAccessError> {
        let mut report = SweepReport::default();

        let cutoff = now - self.policy.recency_threshold_secs;
        for row in self.db.list_sweep_candidates(cutoff).await? {
            report.scanned += 1;
            match self.sweep_grant(&row, now).await {
                Ok(true) => report.granted += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failures += 1;
                    warn!(contact_id = %row.contact.id, error = %e, "Inactivity check failed for contact");
                }
            }
        }

        for row in self.db.list_pending_requests().await? {
            match self.sweep_status_update(&row, now).await {
                Ok(true) => report.status_updates += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failures += 1;
                    warn!(contact_id = %row.contact.id, error = %e, "Status update failed for contact");
                }
            }
        }

        if report.granted > 0 || report.failures > 0 {
            info!(
                scanned = report.scanned,
                granted = report.granted,
                status_updates = report.status_updates,
                failures = report.failures,
                "Inactivity sweep complete"
            );
        } else {
            debug!(
                scanned = report.scanned,
                status_updates = report.status_updates,
                "Inactivity sweep complete"
            );
        }
        Ok(report)
    }

    async fn sweep_grant(
        &self,
        row: &ContactWithOwner,
        now: i64,
    ) -> Result<bool, EmergencyAccessError> {
        let inactive = inactive_days(now, row.owner_activity_reference());
        if row.contact.is_unlock_active || inactive < row.contact.unlock_after_days {
            return Ok(false);
        }
        // Someone else (a request or the owner) got there first.
        if !self.db.activate_unlock(&row.contact.id).await? {
            return Ok(false);
        }

        self.notifications
            .inactivity_warning(&row.contact.user_id)
            .await?;
        self.mailer
            .send(
                &row.owner_email,
                EmailKind::InactivityWarning {
                    contact_email: row.contact.contact_email.clone(),
                },
            )
            .await?;
        self.mailer
            .send(
                &row.contact.contact_email,
                EmailKind::AccessGranted {
                    owner_email: row.owner_email.clone(),
                },
            )
            .await?;

        info!(
            contact_id = %row.contact.id,
            inactive_days = inactive,
            "Access granted after owner inactivity"
        );
        Ok(true)
    }

    async fn sweep_status_update(
        &self,
        row: &ContactWithOwner,
        now: i64,
    ) -> Result<bool, EmergencyAccessError> {
        let days_remaining =
            row.contact.unlock_after_days - inactive_days(now, row.owner_activity_reference());
        if days_remaining <= 1 {
            return Ok(false);
        }
        let throttled = row
            .contact
            .last_status_notice_at
            .is_some_and(|last| now - last < self.policy.status_notice_interval_secs);
        if throttled {
            return Ok(false);
        }

        self.mailer
            .send(
                &row.contact.contact_email,
                EmailKind::AccessStatusUpdate {
                    owner_email: row.owner_email.clone(),
                    days_remaining,
                },
            )
            .await?;
        self.db.mark_status_notice(&row.contact.id, now).await?;

        debug!(contact_id = %row.contact.id, days_remaining, "Status update sent");
        Ok(true)
    }

    // =========================================================================
    // Contact-facing reads
    // =========================================================================

    /// Entries visible to `requester_email` across every owner that has
    /// unlocked them. Never includes `Private` entries.
    pub async fn get_shared_entries(
        &self,
        requester_email: &str,
    ) -> Result<Vec<SharedVaultEntry>, EmergencyAccessError> {
        let now = unix_timestamp();
        let mut shared = Vec::new();

        for row in self.db.list_contacts_of(requester_email).await? {
            if !row.contact.is_unlock_active {
                continue;
            }
            let entries = self
                .db
                .list_visible_entries(&row.contact.user_id, &Visibility::SHAREABLE)
                .await?;

            shared.extend(
                entries
                    .into_iter()
                    .filter(|e| {
                        !(self.policy.enforce_entry_unlock_after
                            && e.visibility == Visibility::UnlockAfter
                            && e.unlock_after.is_some_and(|at| at > now))
                    })
                    .map(|e| SharedVaultEntry {
                        entry: e.into(),
                        vault_owner: VaultOwner {
                            email: row.owner_email.clone(),
                        },
                    }),
            );
        }

        Ok(shared)
    }

    pub async fn check_trusted_contact_access(
        &self,
        requester_email: &str,
    ) -> Result<AccessSummary, EmergencyAccessError> {
        let vault_owners: Vec<_> = self
            .db
            .list_contacts_of(requester_email)
            .await?
            .into_iter()
            .map(|row| VaultOwnerAccess {
                owner_email: row.owner_email,
                is_unlock_active: row.contact.is_unlock_active,
                unlock_after_days: row.contact.unlock_after_days,
                last_requested_at: row.contact.last_requested_at,
            })
            .collect();

        Ok(AccessSummary {
            is_trusted_contact: !vault_owners.is_empty(),
            vault_owners,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Check that `contact_email` names a registered account other than the
    /// owner, returning that account's id.
    async fn resolve_contact(
        &self,
        owner_email: &str,
        contact_email: &str,
    ) -> Result<String, EmergencyAccessError> {
        if owner_email.eq_ignore_ascii_case(contact_email) {
            return Err(EmergencyAccessError::Validation(
                "You cannot be your own trusted contact".into(),
            ));
        }
        self.db
            .get_user_by_email(contact_email)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| {
                EmergencyAccessError::NotFound(
                    "No registered user found with this email".into(),
                )
            })
    }

    async fn announce_contact(
        &self,
        contact_user_id: &str,
        contact_email: &str,
        owner_email: &str,
    ) -> Result<(), EmergencyAccessError> {
        self.mailer
            .send(contact_email, EmailKind::TrustedContactAdded)
            .await?;
        self.notifications
            .trusted_contact_added(contact_user_id, owner_email)
            .await?;
        Ok(())
    }
}

fn validate_unlock_after_days(days: i64) -> Result<(), EmergencyAccessError> {
    if days < 1 {
        return Err(EmergencyAccessError::Validation(
            "unlockAfterDays must be at least 1".into(),
        ));
    }
    Ok(())
}
