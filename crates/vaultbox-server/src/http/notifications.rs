//! `/notifications` handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::Claims;
use crate::storage::{Notification, NotificationKind};

use super::AppState;
use super::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub is_read: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            data: n.data.as_deref().and_then(|d| serde_json::from_str(d).ok()),
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
            updated_at: n.updated_at,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<NotificationView>>, ApiError> {
    let notifications = state.notifications.list(&claims.sub).await?;
    Ok(Json(
        notifications.into_iter().map(NotificationView::from).collect(),
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.notifications.mark_read(&id, &claims.sub).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, ApiError> {
    state.notifications.mark_all_read(&claims.sub).await?;
    Ok(Json(json!({ "success": true })))
}
