//! `/trusted-contacts` handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::emergency::{AccessRequestOutcome, AccessSummary, SharedVaultEntry};
use crate::storage::TrustedContact;

use super::AppState;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSettings {
    pub contact_email: String,
    pub unlock_after_days: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccessBody {
    pub vault_owner_email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAccessBody {
    pub contact_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccessResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_after_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_days: Option<i64>,
}

impl From<AccessRequestOutcome> for RequestAccessResponse {
    fn from(outcome: AccessRequestOutcome) -> Self {
        let (unlock_after_days, inactive_days) = match outcome {
            AccessRequestOutcome::Granted => (None, None),
            AccessRequestOutcome::Pending {
                unlock_after_days,
                inactive_days,
            } => (Some(unlock_after_days), Some(inactive_days)),
        };
        Self {
            status: outcome.status(),
            message: outcome.message(),
            unlock_after_days,
            inactive_days,
        }
    }
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Option<TrustedContact>>, ApiError> {
    Ok(Json(state.emergency.get_trusted_contact(&claims.sub).await?))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<ContactSettings>, JsonRejection>,
) -> Result<(StatusCode, Json<TrustedContact>), ApiError> {
    let Json(body) = body?;
    let contact = state
        .emergency
        .create(&claims.sub, body.contact_email.trim(), body.unlock_after_days)
        .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<ContactSettings>, JsonRejection>,
) -> Result<Json<TrustedContact>, ApiError> {
    let Json(body) = body?;
    let contact = state
        .emergency
        .update(&claims.sub, body.contact_email.trim(), body.unlock_after_days)
        .await?;
    Ok(Json(contact))
}

pub async fn remove_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    state.emergency.remove(&claims.sub).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn check_access(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccessSummary>, ApiError> {
    Ok(Json(
        state
            .emergency
            .check_trusted_contact_access(&claims.email)
            .await?,
    ))
}

pub async fn request_access(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<RequestAccessBody>, JsonRejection>,
) -> Result<Json<RequestAccessResponse>, ApiError> {
    let Json(body) = body?;
    let outcome = state
        .emergency
        .request_access(&claims.email, body.vault_owner_email.trim())
        .await?;
    Ok(Json(outcome.into()))
}

pub async fn shared_entries(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<SharedVaultEntry>>, ApiError> {
    Ok(Json(state.emergency.get_shared_entries(&claims.email).await?))
}

pub async fn grant_access(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<GrantAccessBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    state
        .emergency
        .grant_access(&claims.sub, body.contact_email.trim())
        .await?;
    Ok(Json(json!({
        "status": "granted",
        "message": "Access granted manually by vault owner",
    })))
}
