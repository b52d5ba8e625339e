//! Shared application state for the Observer API server.
//!
//! [`AppState`] is constructed once at startup (or once per test) and
//! handed to every handler behind an [`Arc`](std::sync::Arc). It owns the append-only
//! [`TelemetryStore`] and a [`HubHandle`] for fan-out.

use std::time::Duration;

use chrono::Utc;
use skywatch_core::{HubHandle, StreamEvent, TelemetryStore, matcher};
use skywatch_types::{Aircraft, AlertCriterion};
use tracing::{debug, info, warn};

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState {
    /// Criteria list and alert log.
    pub store: TelemetryStore,
    /// Handle to the broadcast hub.
    pub hub: HubHandle,
    /// Interval between SSE keep-alive comments, if enabled.
    pub keep_alive: Option<Duration>,
}

impl AppState {
    /// Create an application state with an empty store.
    pub fn new(hub: HubHandle) -> Self {
        Self {
            store: TelemetryStore::new(),
            hub,
            keep_alive: None,
        }
    }

    /// Create an application state whose store starts with `criteria`.
    pub fn with_criteria(hub: HubHandle, criteria: impl IntoIterator<Item = AlertCriterion>) -> Self {
        Self {
            store: TelemetryStore::with_criteria(criteria),
            hub,
            keep_alive: None,
        }
    }

    /// Enable SSE keep-alive comments at the given interval.
    #[must_use]
    pub fn with_keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = Some(interval);
        self
    }

    /// Match one accepted telemetry record, record its alerts, and queue
    /// the resulting events for broadcast.
    ///
    /// The store lock covers evaluation, append, and broadcast enqueue so
    /// concurrent ingestions cannot interleave inside the log. Broadcast
    /// enqueue never waits on a consumer. Returns the number of alerts
    /// raised.
    pub async fn ingest(&self, aircraft: &Aircraft) -> usize {
        let mut logs = self.store.lock().await;

        self.publish(StreamEvent::aircraft_update(aircraft));

        let alerts = matcher::evaluate(aircraft, logs.criteria(), Utc::now());
        let raised = alerts.len();
        for alert in alerts {
            info!(
                icao = %alert.aircraft.icao,
                callsign = %alert.aircraft.callsign,
                criterion = ?alert.criterion,
                "ALERT: {}",
                alert.message
            );
            let event = StreamEvent::alert(&alert);
            logs.push_alert(alert);
            self.publish(event);
        }

        debug!(icao = %aircraft.icao, alerts = raised, "telemetry ingested");
        raised
    }

    /// Install a new criterion for all subsequent ingestions.
    pub async fn add_criterion(&self, criterion: AlertCriterion) {
        info!(?criterion, "added new alert criterion");
        self.store.append_criterion(criterion).await;
    }

    /// Hand an event to the hub. Failures are logged and the broadcast is
    /// skipped; what was already recorded stays recorded.
    fn publish(&self, event: Result<StreamEvent, serde_json::Error>) {
        match event {
            Ok(event) => {
                let kind = event.kind();
                if let Err(e) = self.hub.broadcast(event) {
                    warn!(%kind, error = %e, "broadcast skipped");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize stream event, broadcast skipped"),
        }
    }
}
