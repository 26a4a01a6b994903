//! User queries.
//!
//! Accounts are created by the external auth system; the server only reads
//! them and records activity.

use vaultbox_core::db::{DatabaseError, unix_timestamp};

use super::db::VaultDatabase;
use super::models::User;

impl VaultDatabase {
    /// Create a new user.
    pub async fn create_user(
        &self,
        id: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, last_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(id).await
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Find a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Record activity for a user (`last_active = now`).
    pub async fn touch_user(&self, id: &str) -> Result<(), DatabaseError> {
        self.set_user_last_active(id, unix_timestamp()).await
    }

    /// Set a user's `last_active` to an explicit instant.
    pub async fn set_user_last_active(&self, id: &str, at: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(())
    }
}
