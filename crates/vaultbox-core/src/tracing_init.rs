//! Tracing/logging initialization for `VaultBox` binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// Structured JSON, one object per line (for log aggregation).
    Json,
}

impl LogFormat {
    pub const fn from_json_flag(log_json: bool) -> Self {
        if log_json { Self::Json } else { Self::Pretty }
    }
}

/// Build the env-filter: `RUST_LOG` wins, otherwise `default_filter`
/// (e.g. `"vaultbox_server=info"`).
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));
    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    installed.map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_selects_format() {
        assert_eq!(LogFormat::from_json_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_json_flag(false), LogFormat::Pretty);
    }

    #[test]
    fn second_install_is_rejected() {
        // Either this call or another test's may install first; the second
        // attempt in this process must fail instead of panicking.
        let _ = init_tracing("vaultbox_core=debug", LogFormat::Pretty);
        assert!(matches!(
            init_tracing("vaultbox_core=debug", LogFormat::Json),
            Err(Error::Logging(_))
        ));
    }
}
