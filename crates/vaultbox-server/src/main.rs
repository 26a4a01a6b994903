//! `VaultBox` Server
//!
//! REST backend for vault entries and trusted-contact emergency access.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use vaultbox_core::tracing_init::{LogFormat, init_tracing};
use vaultbox_server::auth::JwtManager;
use vaultbox_server::config::{DEFAULT_JWT_SECRET, ServerArgs};
use vaultbox_server::email::LogMailer;
use vaultbox_server::http::{AppState, build_router};
use vaultbox_server::scheduler::Scheduler;
use vaultbox_server::storage::VaultDatabase;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerArgs::parse().into_config()?;

    init_tracing(
        "vaultbox_server=info,tower_http=info",
        LogFormat::from_json_flag(config.log_json),
    )?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.addr,
        "Starting vaultbox-server"
    );
    if config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the built-in development JWT secret; set VAULTBOX_JWT_SECRET");
    }

    info!(path = %config.db_path.display(), "Opening vault database");
    let db = VaultDatabase::open(&config.db_path).await?;

    let jwt = Arc::new(JwtManager::new(config.jwt_secret.as_bytes()));
    let state = AppState::new(db, jwt, Arc::new(LogMailer), config.policy);

    let scheduler = Scheduler::new(
        state.emergency.clone(),
        state.vault.clone(),
        config.sweep_interval,
    )
    .start();

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await?;

    scheduler.shutdown().await;
    info!("Server stopped");
    Ok(())
}
