//! `VaultBox` Server Library
//!
//! - `SQLite` storage for users, trusted contacts, vault entries and notifications
//! - Bearer JWT validation
//! - Emergency access workflow and its periodic inactivity sweep
//! - REST API (axum)

pub mod auth;
pub mod config;
pub mod email;
pub mod emergency;
pub mod http;
pub mod notifications;
pub mod scheduler;
pub mod storage;
pub mod vault;
