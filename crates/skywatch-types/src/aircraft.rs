//! Aircraft telemetry records.
//!
//! [`AircraftReport`] is the body a telemetry producer posts; it carries
//! no timestamp. [`Aircraft`] is the stored form, stamped by the ingestion
//! boundary at the moment the report is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single ADS-B style position report for one aircraft.
///
/// Identity is the [`icao`](Self::icao) address. Field names on the wire
/// follow the dashboard contract (`lat`, `lon`, `alt_baro`, `gs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Aircraft {
    /// Unique ICAO 24-bit transponder address.
    pub icao: String,
    /// Flight callsign (e.g. `SWA123`, `N123AB`).
    pub callsign: String,
    /// Latitude in degrees.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Barometric altitude in feet.
    #[serde(rename = "alt_baro")]
    pub altitude: i32,
    /// Ground speed in knots.
    #[serde(rename = "gs")]
    pub speed: f64,
    /// Track angle in degrees clockwise from true north.
    pub track: f64,
    /// When the server accepted this record.
    pub timestamp: DateTime<Utc>,
}

impl Aircraft {
    /// Stamp a producer report with the time it was received.
    pub fn from_report(report: AircraftReport, received_at: DateTime<Utc>) -> Self {
        Self {
            icao: report.icao,
            callsign: report.callsign,
            latitude: report.latitude,
            longitude: report.longitude,
            altitude: report.altitude,
            speed: report.speed,
            track: report.track,
            timestamp: received_at,
        }
    }
}

/// Telemetry as submitted by a producer to `POST /api/aircraft`.
///
/// Only `icao` is required. Any `timestamp` field in the body is ignored;
/// the server always sets its own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftReport {
    /// Unique ICAO 24-bit transponder address.
    pub icao: String,
    /// Flight callsign.
    #[serde(default)]
    pub callsign: String,
    /// Latitude in degrees.
    #[serde(rename = "lat", default)]
    pub latitude: f64,
    /// Longitude in degrees.
    #[serde(rename = "lon", default)]
    pub longitude: f64,
    /// Barometric altitude in feet.
    #[serde(rename = "alt_baro", default)]
    pub altitude: i32,
    /// Ground speed in knots.
    #[serde(rename = "gs", default)]
    pub speed: f64,
    /// Track angle in degrees clockwise from true north.
    #[serde(default)]
    pub track: f64,
}

impl AircraftReport {
    /// Whether the report identifies an aircraft at all.
    pub fn has_identity(&self) -> bool {
        !self.icao.trim().is_empty()
    }
}
