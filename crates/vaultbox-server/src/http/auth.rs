//! Bearer-token middleware.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::auth::AuthError;
use crate::storage::DatabaseError;

use super::AppState;
use super::error::ApiError;

/// Validate the bearer access token, record the caller's activity, and make
/// the [`Claims`](crate::auth::Claims) available to handlers as an extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let claims = state.jwt.validate_access(token)?;

    // Any authenticated call counts as owner activity.
    match state.db.touch_user(&claims.sub).await {
        Ok(()) => {}
        Err(DatabaseError::NotFound(_)) => {
            debug!(user_id = %claims.sub, "Token for unknown user");
            return Err(ApiError::Unauthorized("Unknown user".into()));
        }
        Err(e) => return Err(e.into()),
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
