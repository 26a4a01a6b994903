//! In-app notification log.
//!
//! Each user has an append-only list of notifications. The workflow appends
//! to it; the owner of the log may only flip read flags.

pub mod service;

pub use service::NotificationService;

use vaultbox_core::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("Failed to encode notification data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
