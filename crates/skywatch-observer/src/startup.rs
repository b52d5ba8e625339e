//! Observer server startup helper.
//!
//! Provides [`spawn_observer`] which binds the listener and then runs the
//! Observer HTTP + SSE server on a background Tokio task.
//!
//! # Usage
//!
//! ```rust,ignore
//! use skywatch_core::Hub;
//! use skywatch_observer::{spawn_observer, AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let (hub, _hub_task) = Hub::spawn(256);
//! let state = Arc::new(AppState::new(hub));
//! let (addr, handle) = spawn_observer(&ServerConfig::default(), state).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Bind the configured address and serve on a background task.
///
/// Binding happens before the task is spawned so an unusable address is
/// reported to the caller. Returns the bound address (useful with port
/// `0`) and a [`JoinHandle`] the caller can abort on shutdown.
pub async fn spawn_observer(
    config: &ServerConfig,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let listener = server::bind(config).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("local address unavailable: {e}")))?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok((addr, handle))
}
