//! JWT claims carried by `VaultBox` session tokens.

use serde::{Deserialize, Serialize};

/// Which half of a session a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims embedded in session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (user ID).
    pub sub: String,
    /// Account email; trusted-contact lookups are keyed by it.
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
    pub token_type: TokenType,
}

impl Claims {
    pub fn is_access(&self) -> bool {
        self.token_type == TokenType::Access
    }

    pub fn is_refresh(&self) -> bool {
        self.token_type == TokenType::Refresh
    }
}
