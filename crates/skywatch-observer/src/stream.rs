//! Server-Sent Events endpoint for live telemetry and alerts.
//!
//! Clients connect to `GET /api/events` and receive one
//! `aircraftUpdate` frame per ingested record and one `alert` frame per
//! raised alert:
//!
//! ```text
//! event: aircraftUpdate
//! data: {"icao":"AABBCC","callsign":"TARGET1","lat":..}
//!
//! ```
//!
//! Each connection gets its own [`Subscription`](skywatch_core::Subscription).
//! The response body ends when the hub closes the subscription's queue
//! (the client fell too far behind). When the peer goes away or a write
//! fails, the body stream is dropped, which unregisters the client.
//! Each frame is handed to the transport as its own chunk, so nothing is
//! held back waiting for more data.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt as _;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Open a live event stream for one client.
///
/// # Route
///
/// `GET /api/events`
///
/// # Errors
///
/// Returns 500 without registering anything if the hub is not running.
pub async fn events(State(state): State<Arc<AppState>>) -> Result<Response, ObserverError> {
    let subscription = state.hub.connect()?;
    info!(client = %subscription.id(), "SSE client entering send loop");

    let frames = subscription.map(|event| {
        Ok::<_, Infallible>(Event::default().event(event.kind().as_str()).data(event.data()))
    });

    let headers = [
        (header::CACHE_CONTROL, "no-cache"),
        (header::CONNECTION, "keep-alive"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    ];

    // `keep_alive` wraps the stream type, so each branch builds its own response.
    let response = match state.keep_alive {
        Some(interval) => (
            headers,
            Sse::new(frames).keep_alive(KeepAlive::new().interval(interval)),
        )
            .into_response(),
        None => (headers, Sse::new(frames)).into_response(),
    };
    Ok(response)
}
