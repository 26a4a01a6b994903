//! `SQLite` storage for the `VaultBox` server.
//!
//! Persists users, trusted contacts, vault entries, and notifications.

mod db;
mod models;
mod queries_contacts;
mod queries_entries;
mod queries_notifications;
mod queries_users;


pub use db::VaultDatabase;
pub use models::*;
pub use queries_entries::NewVaultEntry;
pub use queries_notifications::NewNotification;
pub use vaultbox_core::db::DatabaseError;
