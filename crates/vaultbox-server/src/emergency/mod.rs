//! Emergency access: trusted contacts and the request/grant workflow.
//!
//! An owner names one trusted contact. The contact's access to the owner's
//! shared entries moves `NoRequest -> Pending -> Granted` and never back,
//! except when the owner replaces the contact, which starts the new contact
//! from `NoRequest`. Access is granted when the owner has been inactive for
//! `unlock_after_days`, or when the owner grants it directly.

mod service;
mod types;


pub use service::EmergencyAccessService;
pub use types::{
    AccessPolicy, AccessRequestOutcome, AccessSummary, SharedVaultEntry, SweepReport,
    VaultOwner, VaultOwnerAccess, inactive_days,
};

use vaultbox_core::db::DatabaseError;

use crate::email::EmailError;
use crate::notifications::NotificationError;

#[derive(Debug, thiserror::Error)]
pub enum EmergencyAccessError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

impl From<DatabaseError> for EmergencyAccessError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            // A concurrent writer won the UNIQUE race.
            DatabaseError::Conflict(_) => {
                Self::Conflict("Trusted contact already exists".to_string())
            }
            other => Self::Database(other),
        }
    }
}
