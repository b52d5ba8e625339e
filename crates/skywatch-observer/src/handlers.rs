//! REST API endpoint handlers for the Observer server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/aircraft` | Ingest one telemetry record |
//! | `GET` | `/api/alert-criteria` | List watch criteria |
//! | `POST` | `/api/alert-criteria` | Add a watch criterion |
//! | `GET` | `/api/alerts` | Alert history, in trigger order |
//! | `GET` | `/api/status` | Connected clients and log sizes |
//!
//! Request bodies are decoded by hand from raw bytes so that a malformed
//! body always gets the same JSON error, whatever its content type.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use skywatch_types::{Aircraft, AircraftReport, AlertCriterion};
use tracing::debug;

use crate::error::ObserverError;
use crate::state::AppState;

const INVALID_AIRCRAFT: &str = "Invalid aircraft data";
const INVALID_CRITERIA: &str = "Invalid criteria data";

// ---------------------------------------------------------------------------
// POST /api/aircraft -- telemetry ingestion
// ---------------------------------------------------------------------------

/// Accept one telemetry record from a producer.
///
/// The server stamps the record, matches it against the current criteria,
/// appends any alerts, and queues an `aircraftUpdate` event plus one
/// `alert` event per match. A malformed body is rejected with 400 before
/// anything is recorded or broadcast.
pub async fn ingest_aircraft(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ObserverError> {
    let report: AircraftReport = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "error decoding aircraft data");
        ObserverError::InvalidPayload(INVALID_AIRCRAFT)
    })?;
    if !report.has_identity() {
        debug!("aircraft report without icao rejected");
        return Err(ObserverError::InvalidPayload(INVALID_AIRCRAFT));
    }

    let aircraft = Aircraft::from_report(report, Utc::now());
    state.ingest(&aircraft).await;

    Ok(Json(serde_json::json!({ "status": "received" })))
}

// ---------------------------------------------------------------------------
// /api/alert-criteria -- watch criteria
// ---------------------------------------------------------------------------

/// Add a watch criterion and echo it back with 201.
///
/// A criterion with neither `icao` nor `callsign` populated is rejected.
pub async fn add_alert_criterion(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ObserverError> {
    let criterion: AlertCriterion = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "error decoding alert criteria");
        ObserverError::InvalidPayload(INVALID_CRITERIA)
    })?;
    if criterion.is_empty() {
        return Err(ObserverError::InvalidPayload(INVALID_CRITERIA));
    }

    state.add_criterion(criterion.clone()).await;

    Ok((StatusCode::CREATED, Json(criterion)))
}

/// List the installed criteria in the order they were added.
pub async fn list_alert_criteria(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.snapshot_criteria().await)
}

// ---------------------------------------------------------------------------
// GET /api/alerts -- alert history
// ---------------------------------------------------------------------------

/// Return every alert raised so far, oldest first.
pub async fn list_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.store.snapshot_alerts().await)
}

// ---------------------------------------------------------------------------
// GET /api/status -- summary
// ---------------------------------------------------------------------------

/// Report how many clients are streaming and how large each log is.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (criteria, alerts) = {
        let guard = state.store.lock().await;
        (guard.criteria().len(), guard.alert_count())
    };
    Json(serde_json::json!({
        "clients": state.hub.client_count(),
        "criteria": criteria,
        "alerts": alerts,
    }))
}
