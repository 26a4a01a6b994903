//! `/vault` handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::vault::{EntryChanges, EntryView, NewEntry};

use super::AppState;
use super::error::ApiError;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<EntryView>>, ApiError> {
    Ok(Json(state.vault.list(&claims.sub).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<NewEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<EntryView>), ApiError> {
    let Json(body) = body?;
    let entry = state.vault.create(&claims.sub, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<EntryView>, ApiError> {
    Ok(Json(state.vault.get(&claims.sub, &id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Result<Json<EntryChanges>, JsonRejection>,
) -> Result<Json<EntryView>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.vault.update(&claims.sub, &id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.vault.delete(&claims.sub, &id).await?;
    Ok(Json(json!({ "success": true })))
}
