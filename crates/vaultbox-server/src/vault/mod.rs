//! Owner-facing vault entry management.
//!
//! Entry content is ciphertext produced by the client and passes through
//! untouched.

pub mod service;
pub mod types;

pub use service::VaultService;
pub use types::{EntryChanges, EntryView, NewEntry};

use vaultbox_core::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("Vault entry not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for VaultError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(what),
            other => Self::Database(other),
        }
    }
}
