//! JWT issuance and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use vaultbox_core::db::unix_timestamp;

use super::claims::{Claims, TokenType};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Expected an access token")]
    WrongTokenType,
}

/// Lifetime of tokens minted by [`JwtManager::issue_access_token`].
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Validates HS256 session tokens issued by the identity service.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mint an access token in the identity service's format.
    ///
    /// The server never starts sessions itself; integration tests use this
    /// to act as a signed-in user.
    pub fn issue_access_token(&self, user_id: &str, email: &str) -> Result<String, AuthError> {
        self.issue(user_id, email, TokenType::Access, ACCESS_TOKEN_TTL_SECS)
    }

    fn issue(
        &self,
        user_id: &str,
        email: &str,
        token_type: TokenType,
        ttl_secs: i64,
    ) -> Result<String, AuthError> {
        let now = unix_timestamp();
        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + ttl_secs,
            token_type,
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Validate a token's signature and expiry and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Validate a token that must be an access token.
    pub fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if !claims.is_access() {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_jwt() -> JwtManager {
        JwtManager::new(b"test-secret-key-for-testing")
    }

    #[test]
    fn issue_and_validate_access_token() {
        let jwt = test_jwt();
        let token = jwt.issue_access_token("user-1", "alice@example.com").unwrap();

        let claims = jwt.validate_access(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);
        assert!(claims.is_access());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let jwt = test_jwt();
        let token = jwt
            .issue("user-1", "alice@example.com", TokenType::Refresh, 86_400)
            .unwrap();

        assert!(jwt.validate(&token).unwrap().is_refresh());
        assert!(matches!(
            jwt.validate_access(&token),
            Err(AuthError::WrongTokenType)
        ));
    }

    #[test]
    fn expired_token_fails_validation() {
        let jwt = test_jwt();
        // Well past the default 60 s leeway.
        let token = jwt
            .issue("user-1", "alice@example.com", TokenType::Access, -600)
            .unwrap();

        assert!(matches!(
            jwt.validate_access(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn invalid_token_fails_validation() {
        let jwt = test_jwt();
        assert!(jwt.validate("not-a-valid-token").is_err());
    }

    #[test]
    fn wrong_secret_fails_validation() {
        let jwt1 = test_jwt();
        let jwt2 = JwtManager::new(b"different-secret");

        let token = jwt1.issue_access_token("user-1", "alice@example.com").unwrap();
        assert!(jwt2.validate(&token).is_err());
    }
}
