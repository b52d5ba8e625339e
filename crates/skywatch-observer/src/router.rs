//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + SSE) into a single [`Router`] with CORS
//! middleware enabled so a dashboard served from another origin can
//! subscribe.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::stream;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `POST /api/aircraft` -- telemetry ingestion
/// - `GET /api/alert-criteria` -- list criteria
/// - `POST /api/alert-criteria` -- add a criterion
/// - `GET /api/alerts` -- alert history
/// - `GET /api/status` -- client and log counts
/// - `GET /api/events` -- SSE stream
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/aircraft", post(handlers::ingest_aircraft))
        .route(
            "/api/alert-criteria",
            get(handlers::list_alert_criteria).post(handlers::add_alert_criterion),
        )
        .route("/api/alerts", get(handlers::list_alerts))
        .route("/api/status", get(handlers::status))
        .route("/api/events", get(stream::events))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
