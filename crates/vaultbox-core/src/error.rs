//! Startup errors shared by `VaultBox` binaries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The global tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}
