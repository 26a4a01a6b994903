//! Command-line / environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::emergency::AccessPolicy;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Parser, Debug)]
#[command(name = "vaultbox-server")]
#[command(
    version,
    about = "VaultBox server - vault entries, trusted contacts and emergency access"
)]
pub struct ServerArgs {
    /// Address to listen on.
    #[arg(long, env = "VAULTBOX_ADDR", default_value = "0.0.0.0:3001")]
    pub addr: SocketAddr,

    /// Path to SQLite database file [default: ~/.vaultbox/vaultbox.db].
    #[arg(long, env = "VAULTBOX_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Secret shared with the identity service for HS256 session tokens.
    #[arg(long, env = "VAULTBOX_JWT_SECRET", default_value = DEFAULT_JWT_SECRET)]
    pub jwt_secret: String,

    /// Seconds between inactivity sweeps.
    #[arg(long, env = "VAULTBOX_SWEEP_INTERVAL", default_value_t = 3600)]
    pub sweep_interval: u64,

    /// Owners active within this many hours are skipped by the sweep.
    #[arg(long, env = "VAULTBOX_RECENCY_THRESHOLD_HOURS", default_value_t = 24)]
    pub recency_threshold_hours: i64,

    /// Minimum hours between status-update emails for one pending request.
    #[arg(long, env = "VAULTBOX_STATUS_NOTICE_HOURS", default_value_t = 24)]
    pub status_notice_hours: i64,

    /// Hide UnlockAfter entries from contacts until the entry's own unlock
    /// instant has passed.
    #[arg(long, env = "VAULTBOX_ENFORCE_ENTRY_UNLOCK_AFTER")]
    pub enforce_entry_unlock_after: bool,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "VAULTBOX_LOG_JSON")]
    pub log_json: bool,
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub sweep_interval: Duration,
    pub policy: AccessPolicy,
    pub log_json: bool,
}

impl ServerArgs {
    pub fn into_config(self) -> vaultbox_core::Result<ServerConfig> {
        if self.sweep_interval == 0 {
            return Err(config_error("--sweep-interval must be positive"));
        }
        if self.jwt_secret.is_empty() {
            return Err(config_error("--jwt-secret must not be empty"));
        }

        let db_path = match self.db_path {
            Some(path) => path,
            None => default_db_path()?,
        };

        Ok(ServerConfig {
            addr: self.addr,
            db_path,
            jwt_secret: self.jwt_secret,
            sweep_interval: Duration::from_secs(self.sweep_interval),
            policy: AccessPolicy {
                recency_threshold_secs: hours_to_secs(
                    self.recency_threshold_hours,
                    "--recency-threshold-hours",
                )?,
                status_notice_interval_secs: hours_to_secs(
                    self.status_notice_hours,
                    "--status-notice-hours",
                )?,
                enforce_entry_unlock_after: self.enforce_entry_unlock_after,
            },
            log_json: self.log_json,
        })
    }
}

pub fn default_db_path() -> vaultbox_core::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| config_error("Cannot determine home directory"))?;
    Ok(home.join(".vaultbox").join("vaultbox.db"))
}

/// Non-negative hours to seconds, refusing values that overflow `i64`.
fn hours_to_secs(hours: i64, flag: &str) -> vaultbox_core::Result<i64> {
    if hours < 0 {
        return Err(config_error(&format!("{flag} must not be negative")));
    }
    hours
        .checked_mul(3600)
        .ok_or_else(|| config_error(&format!("{flag} is too large")))
}

fn config_error(msg: &str) -> vaultbox_core::Error {
    vaultbox_core::Error::Config(msg.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerArgs {
        let argv = std::iter::once("vaultbox-server").chain(args.iter().copied());
        ServerArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags_build_policy() {
        let config = parse(&[
            "--db-path",
            "/tmp/vb.db",
            "--sweep-interval",
            "60",
            "--recency-threshold-hours",
            "12",
            "--status-notice-hours",
            "48",
            "--enforce-entry-unlock-after",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/vb.db"));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.policy.recency_threshold_secs, 12 * 3600);
        assert_eq!(config.policy.status_notice_interval_secs, 48 * 3600);
        assert!(config.policy.enforce_entry_unlock_after);
    }

    #[test]
    fn defaults_match_daily_policy() {
        let config = parse(&["--db-path", "/tmp/vb.db"]).into_config().unwrap();
        assert_eq!(config.policy, AccessPolicy::default());
        assert_eq!(config.sweep_interval, Duration::from_secs(3600));
        assert!(!config.log_json);
    }

    #[test]
    fn zero_sweep_interval_is_rejected() {
        let err = parse(&["--db-path", "/tmp/vb.db", "--sweep-interval", "0"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, vaultbox_core::Error::Config(_)));
    }

    #[test]
    fn overflowing_hours_are_rejected() {
        for flag in ["--recency-threshold-hours", "--status-notice-hours"] {
            let err = parse(&["--db-path", "/tmp/vb.db", flag, "9223372036854775807"])
                .into_config()
                .unwrap_err();
            assert!(
                matches!(&err, vaultbox_core::Error::Config(msg) if msg.contains(flag)),
                "{err}"
            );
        }
    }

    #[test]
    fn negative_hours_are_rejected() {
        let err = parse(&["--db-path", "/tmp/vb.db", "--status-notice-hours=-1"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, vaultbox_core::Error::Config(_)));
    }
}
