//! In-memory telemetry store: the criteria list and the alert log.
//!
//! Both logs are append-only for the lifetime of the process and share one
//! [`Mutex`]. Ingestion takes the lock through [`TelemetryStore::lock`] so
//! that reading the criteria, appending the alerts they raise, and queueing
//! the broadcasts happen as one step relative to other ingestions.
//! Snapshot reads return owned copies, never references into live state.

use skywatch_types::{Alert, AlertCriterion};
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Logs {
    criteria: Vec<AlertCriterion>,
    alerts: Vec<Alert>,
}

/// Append-only criteria list and alert log.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    logs: Mutex<Logs>,
}

impl TelemetryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with criteria, in order.
    pub fn with_criteria(criteria: impl IntoIterator<Item = AlertCriterion>) -> Self {
        Self {
            logs: Mutex::new(Logs {
                criteria: criteria.into_iter().collect(),
                alerts: Vec::new(),
            }),
        }
    }

    /// Add a criterion. It takes part in every evaluation that locks the
    /// store afterwards.
    pub async fn append_criterion(&self, criterion: AlertCriterion) {
        self.logs.lock().await.criteria.push(criterion);
    }

    /// Append one alert to the log.
    pub async fn append_alert(&self, alert: Alert) {
        self.logs.lock().await.alerts.push(alert);
    }

    /// Owned copy of the criteria, in the order they were added.
    pub async fn snapshot_criteria(&self) -> Vec<AlertCriterion> {
        self.logs.lock().await.criteria.clone()
    }

    /// Owned copy of the alert log, in trigger order.
    pub async fn snapshot_alerts(&self) -> Vec<Alert> {
        self.logs.lock().await.alerts.clone()
    }

    /// Hold the store for a read-evaluate-append sequence.
    ///
    /// The guard must not be held across a network write.
    pub async fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            logs: self.logs.lock().await,
        }
    }
}

/// Exclusive access to the store for one ingestion.
///
/// Exposes read access to the criteria and append-only access to the
/// alert log.
#[derive(Debug)]
pub struct StoreGuard<'a> {
    logs: MutexGuard<'a, Logs>,
}

impl StoreGuard<'_> {
    /// The criteria as of this lock, in the order they were added.
    pub fn criteria(&self) -> &[AlertCriterion] {
        &self.logs.criteria
    }

    /// Number of alerts raised as of this lock.
    pub fn alert_count(&self) -> usize {
        self.logs.alerts.len()
    }

    /// Append one alert to the log.
    pub fn push_alert(&mut self, alert: Alert) {
        self.logs.alerts.push(alert);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use skywatch_types::Aircraft;

    use super::*;
    use crate::matcher;

    fn aircraft(icao: &str, callsign: &str) -> Aircraft {
        Aircraft {
            icao: icao.to_owned(),
            callsign: callsign.to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            speed: 0.0,
            track: 0.0,
            timestamp: Utc::now(),
        }
    }

    fn alert_for(icao: &str) -> Alert {
        Alert::raise(&aircraft(icao, ""), &AlertCriterion::by_icao(icao), Utc::now())
    }

    #[tokio::test]
    async fn alerts_are_returned_in_trigger_order() {
        let store = TelemetryStore::new();
        for icao in ["A", "B", "C"] {
            store.append_alert(alert_for(icao)).await;
        }
        let icaos: Vec<String> = store
            .snapshot_alerts()
            .await
            .into_iter()
            .map(|a| a.aircraft.icao)
            .collect();
        assert_eq!(icaos, ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn snapshots_are_independent_copies() {
        let store = TelemetryStore::with_criteria([AlertCriterion::by_icao("AABBCC")]);
        store.append_alert(alert_for("AABBCC")).await;

        let mut alerts = store.snapshot_alerts().await;
        alerts[0].message = "tampered".to_owned();
        alerts.clear();
        let mut criteria = store.snapshot_criteria().await;
        criteria.push(AlertCriterion::by_icao("ZZZZZZ"));

        assert_ne!(store.snapshot_alerts().await[0].message, "tampered");
        let guard = store.lock().await;
        assert_eq!(guard.alert_count(), 1);
        assert_eq!(guard.criteria().len(), 1);
    }

    #[tokio::test]
    async fn criteria_keep_insertion_order() {
        let store = TelemetryStore::with_criteria([AlertCriterion::by_callsign("TARGET1")]);
        store.append_criterion(AlertCriterion::by_icao("AABBCC")).await;
        let criteria = store.snapshot_criteria().await;
        assert_eq!(criteria[0], AlertCriterion::by_callsign("TARGET1"));
        assert_eq!(criteria[1], AlertCriterion::by_icao("AABBCC"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_ingestions_both_land() {
        let store = Arc::new(TelemetryStore::with_criteria([
            AlertCriterion::by_icao("XXXXXX"),
            AlertCriterion::by_icao("YYYYYY"),
        ]));

        let tasks: Vec<_> = ["XXXXXX", "YYYYYY"]
            .into_iter()
            .map(|icao| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let record = aircraft(icao, "");
                    let mut guard = store.lock().await;
                    for alert in matcher::evaluate(&record, guard.criteria(), Utc::now()) {
                        guard.push_alert(alert);
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut icaos: Vec<String> = store
            .snapshot_alerts()
            .await
            .into_iter()
            .map(|a| a.aircraft.icao)
            .collect();
        icaos.sort();
        assert_eq!(icaos, ["XXXXXX", "YYYYYY"]);
    }
}
