//! REST surface.
//!
//! Every route except the keep-alive endpoints requires a bearer access
//! token; see [`auth::require_auth`].

mod auth;
pub mod error;
mod notifications;
mod trusted_contacts;
mod vault;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::JwtManager;
use crate::email::Mailer;
use crate::emergency::{AccessPolicy, EmergencyAccessService};
use crate::notifications::NotificationService;
use crate::storage::VaultDatabase;
use crate::vault::VaultService;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: VaultDatabase,
    pub jwt: Arc<JwtManager>,
    pub emergency: EmergencyAccessService,
    pub notifications: NotificationService,
    pub vault: VaultService,
}

impl AppState {
    /// Wire the services over one database.
    pub fn new(
        db: VaultDatabase,
        jwt: Arc<JwtManager>,
        mailer: Arc<dyn Mailer>,
        policy: AccessPolicy,
    ) -> Self {
        let notifications = NotificationService::new(db.clone());
        let emergency =
            EmergencyAccessService::new(db.clone(), notifications.clone(), mailer, policy);
        let vault = VaultService::new(db.clone());
        Self {
            db,
            jwt,
            emergency,
            notifications,
            vault,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route(
            "/trusted-contacts",
            get(trusted_contacts::get_contact)
                .post(trusted_contacts::create_contact)
                .put(trusted_contacts::update_contact)
                .delete(trusted_contacts::remove_contact),
        )
        .route(
            "/trusted-contacts/check-access",
            get(trusted_contacts::check_access),
        )
        .route(
            "/trusted-contacts/request-access",
            post(trusted_contacts::request_access),
        )
        .route(
            "/trusted-contacts/shared-entries",
            get(trusted_contacts::shared_entries),
        )
        .route(
            "/trusted-contacts/grant-access",
            post(trusted_contacts::grant_access),
        )
        .route("/notifications", get(notifications::list))
        .route("/notifications/mark-all-read", put(notifications::mark_all_read))
        .route("/notifications/{id}/read", put(notifications::mark_read))
        .route("/vault", get(vault::list).post(vault::create))
        .route(
            "/vault/{id}",
            get(vault::get_entry).put(vault::update).delete(vault::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let public = Router::new()
        .route("/", get(health))
        .route("/health", get(health));

    Router::new()
        .merge(authenticated)
        .merge(public)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
