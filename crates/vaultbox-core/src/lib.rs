//! `VaultBox` Core Library
//!
//! Shared functionality for `VaultBox` components:
//! - `SQLite` connection helpers and the `define_database!` macro
//! - Tracing/logging initialisation
//! - Common error types

pub mod db;
pub mod error;
pub mod tracing_init;

pub use error::{Error, Result};
