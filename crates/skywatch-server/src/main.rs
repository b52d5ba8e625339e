//! Skywatch alert server binary.
//!
//! Wires together the broadcast hub, the telemetry store, and the Observer
//! HTTP server, then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `skywatch-config.yaml` (or `SKYWATCH_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Start the broadcast hub
//! 4. Seed the criteria list
//! 5. Bind and spawn the Observer server
//! 6. Wait for `Ctrl-C`

mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use skywatch_core::{Hub, SkywatchConfig};
use skywatch_observer::{AppState, ServerConfig, spawn_observer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "skywatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot be
/// bound, or the shutdown signal cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("skywatch-server starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        client_queue_capacity = config.stream.client_queue_capacity,
        keep_alive_secs = config.stream.keep_alive_secs,
        seed_criteria = config.alerts.seed_criteria.len(),
        "Configuration loaded"
    );

    // 3. Start the broadcast hub.
    let (hub, _hub_task) = Hub::spawn(config.stream.client_queue_capacity);

    // 4. Assemble shared state with the seed criteria.
    let mut state = AppState::with_criteria(hub, config.alerts.seed_criteria.iter().cloned());
    if config.stream.keep_alive_secs > 0 {
        state = state.with_keep_alive(Duration::from_secs(config.stream.keep_alive_secs));
    }

    // 5. Start the Observer API server.
    let (addr, server) = spawn_observer(&ServerConfig::from(&config.server), Arc::new(state))
        .await
        .map_err(AppError::from)?;
    info!(%addr, "Aircraft alert server started");

    // 6. Run until interrupted.
    tokio::signal::ctrl_c().await.map_err(AppError::from)?;
    info!("Shutting down server");
    server.abort();
    info!("Server exiting");

    Ok(())
}

/// Load configuration from `SKYWATCH_CONFIG` or `skywatch-config.yaml`.
///
/// A missing file means defaults (environment overrides still apply).
fn load_config() -> Result<SkywatchConfig, AppError> {
    let path = std::env::var("SKYWATCH_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        Ok(SkywatchConfig::from_file(&path)?)
    } else {
        Ok(SkywatchConfig::parse("")?)
    }
}
