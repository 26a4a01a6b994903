//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::emergency::EmergencyAccessError;
use crate::notifications::NotificationError;
use crate::storage::DatabaseError;
use crate::vault::VaultError;

/// Error returned by handlers. Serialized as `{"statusCode", "message"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({ "statusCode": status.as_u16(), "message": message });
        (status, Json(body)).into_response()
    }
}

impl From<EmergencyAccessError> for ApiError {
    fn from(e: EmergencyAccessError) -> Self {
        match e {
            EmergencyAccessError::NotFound(m) => Self::NotFound(m),
            EmergencyAccessError::Conflict(m) => Self::Conflict(m),
            EmergencyAccessError::Validation(m) => Self::BadRequest(m),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(e: VaultError) -> Self {
        match e {
            VaultError::NotFound(_) => Self::NotFound("Vault entry not found".into()),
            VaultError::Validation(m) => Self::BadRequest(m),
            VaultError::Database(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound(_) => Self::NotFound("Notification not found".into()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingToken => Self::Unauthorized("Missing authorization header".into()),
            AuthError::InvalidToken(_) => Self::Unauthorized("Invalid token".into()),
            AuthError::WrongTokenType => Self::Unauthorized("Not an access token".into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
