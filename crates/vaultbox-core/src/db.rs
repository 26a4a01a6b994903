//! `SQLite` plumbing shared by `VaultBox` storage layers.
//!
//! [`connect_file`] and [`connect_memory`] build pools with the settings the
//! server relies on (foreign keys always on, WAL for file databases), and
//! [`define_database!`](crate::define_database) stamps out a typed handle
//! that runs the invoking crate's embedded migrations on open.

use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::debug;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_SIZE: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database directory unavailable: {0}")]
    Io(String),

    #[error("cannot connect to database: {0}")]
    Connection(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("query failed: {0}")]
    Query(String),

    /// Payload names the missing thing, e.g. `"Trusted contact"`.
    #[error("{0} not found")]
    NotFound(String),

    /// A UNIQUE constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::Conflict(db.message().to_string());
            }
        }
        if matches!(e, sqlx::Error::RowNotFound) {
            return Self::NotFound("Row".to_string());
        }
        Self::Query(e.to_string())
    }
}

/// Pool over a database file, created along with its parent directory if
/// missing.
pub async fn connect_file(path: &Path) -> Result<Pool<Sqlite>, DatabaseError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| DatabaseError::Io(e.to_string()))?;
    }

    let url = format!("sqlite:{}?mode=rwc", path.display());
    let options = parse_options(&url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = connect(SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE), options).await?;
    debug!(path = %path.display(), "SQLite file pool ready");
    Ok(pool)
}

/// Pool over a private in-memory database.
///
/// Pinned to one connection that is never recycled: each `:memory:`
/// connection is its own database, and closing it drops the data.
pub async fn connect_memory() -> Result<Pool<Sqlite>, DatabaseError> {
    let pool_options = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None);
    connect(pool_options, parse_options("sqlite::memory:")?).await
}

fn parse_options(url: &str) -> Result<SqliteConnectOptions, DatabaseError> {
    SqliteConnectOptions::from_str(url)
        .map(|o| o.foreign_keys(true))
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

async fn connect(
    pool_options: SqlitePoolOptions,
    options: SqliteConnectOptions,
) -> Result<Pool<Sqlite>, DatabaseError> {
    pool_options
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

/// Seconds since the Unix epoch. All persisted timestamps use this unit.
#[allow(clippy::cast_possible_wrap)]
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

/// Declare a cloneable database handle whose constructors connect and then
/// apply the `./migrations` directory of the invoking crate.
///
/// ```ignore
/// vaultbox_core::define_database!(VaultDatabase, "vault");
/// ```
///
/// The second argument is recorded as the `database` field of the
/// migration log event.
#[macro_export]
macro_rules! define_database {
    ($name:ident, $label:literal) => {
        #[derive(Clone)]
        pub struct $name {
            pool: ::sqlx::Pool<::sqlx::Sqlite>,
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("connections", &self.pool.size())
                    .finish()
            }
        }

        impl $name {
            pub async fn open(
                path: &::std::path::Path,
            ) -> ::std::result::Result<Self, $crate::db::DatabaseError> {
                Self::migrated($crate::db::connect_file(path).await?).await
            }

            /// Fresh private database, used by tests.
            pub async fn open_in_memory() -> ::std::result::Result<Self, $crate::db::DatabaseError>
            {
                Self::migrated($crate::db::connect_memory().await?).await
            }

            async fn migrated(
                pool: ::sqlx::Pool<::sqlx::Sqlite>,
            ) -> ::std::result::Result<Self, $crate::db::DatabaseError> {
                ::sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| $crate::db::DatabaseError::Migration(e.to_string()))?;
                ::tracing::info!(database = $label, "Migrations applied");
                Ok(Self { pool })
            }

            pub const fn pool(&self) -> &::sqlx::Pool<::sqlx::Sqlite> {
                &self.pool
            }

            /// Wait for outstanding connections to finish and close the pool.
            pub async fn close(&self) {
                self.pool.close().await;
            }
        }
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_recent_seconds() {
        // 2024-01-01T00:00:00Z
        assert!(unix_timestamp() > 1_704_067_200);
        // Not milliseconds.
        assert!(unix_timestamp() < 10_000_000_000);
    }

    #[tokio::test]
    async fn file_pool_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("vaultbox.db");

        let pool = connect_file(&path).await.unwrap();
        let (one,): (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();

        assert_eq!(one, 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect_memory().await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn sqlx_errors_are_classified() {
        let pool = connect_memory().await.unwrap();
        sqlx::query("CREATE TABLE t (k TEXT NOT NULL UNIQUE)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (k) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap();

        let dup: DatabaseError = sqlx::query("INSERT INTO t (k) VALUES ('a')")
            .execute(&pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(dup, DatabaseError::Conflict(_)));

        let missing: DatabaseError = sqlx::query("SELECT k FROM t WHERE k = 'zzz'")
            .fetch_one(&pool)
            .await
            .err().unwrap()
            .into();
        assert!(matches!(missing, DatabaseError::NotFound(_)));

        let bad: DatabaseError = sqlx::query("SELECT * FROM nope")
            .fetch_all(&pool)
            .await
            .err().unwrap()
            .into();
        assert!(matches!(bad, DatabaseError::Query(_)));
    }
}
