//! Main entry point for the Registrar backend.
//!
//! Loads configuration, opens and migrates the database, seeds the bootstrap
//! admin, starts the revocation compaction task and serves the API.

use anyhow::Context;
use registrar::auth::revocation::spawn_compaction_task;
use registrar::config::Config;
use registrar::database::Database;
use registrar::{AppState, build_app};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;
    db.migrate().await?;

    let state = AppState::new(db.pool().clone(), config.clone())
        .context("failed to initialise token codec")?;

    if let Some(password) = &config.bootstrap_admin_password {
        state
            .user_service()
            .ensure_bootstrap_admin(&config.bootstrap_admin_username, password)
            .await
            .context("failed to seed bootstrap admin")?;
    }

    let compaction = spawn_compaction_task(
        state.registry.clone(),
        Duration::from_secs(config.revocation_compact_interval_seconds),
    );

    let app = build_app(state);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting Registrar server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await?;

    compaction.abort();
    db.close().await;
    Ok(())
}
