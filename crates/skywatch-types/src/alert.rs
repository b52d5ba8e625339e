//! Watch criteria and the alerts they raise.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::aircraft::Aircraft;

/// A watch rule registered by an operator.
///
/// Each populated field is matched on its own: an aircraft matches when
/// its ICAO address equals [`icao`](Self::icao) **or** its callsign equals
/// [`callsign`](Self::callsign). Empty strings count as unpopulated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlertCriterion {
    /// ICAO address to watch for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub icao: Option<String>,
    /// Callsign to watch for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub callsign: Option<String>,
}

impl AlertCriterion {
    /// Criterion watching a single ICAO address.
    pub fn by_icao(icao: impl Into<String>) -> Self {
        Self {
            icao: Some(icao.into()),
            callsign: None,
        }
    }

    /// Criterion watching a single callsign.
    pub fn by_callsign(callsign: impl Into<String>) -> Self {
        Self {
            icao: None,
            callsign: Some(callsign.into()),
        }
    }

    /// Whether neither field is populated. Such a criterion can never match.
    pub fn is_empty(&self) -> bool {
        populated(self.icao.as_ref()).is_none() && populated(self.callsign.as_ref()).is_none()
    }

    /// Whether this criterion matches the given aircraft.
    pub fn matches(&self, aircraft: &Aircraft) -> bool {
        let icao_hit = populated(self.icao.as_ref()).is_some_and(|icao| icao == aircraft.icao);
        let callsign_hit = populated(self.callsign.as_ref())
            .is_some_and(|callsign| callsign == aircraft.callsign);
        icao_hit || callsign_hit
    }
}

fn populated(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|value| !value.is_empty())
}

/// An alert raised when telemetry matched a criterion.
///
/// Immutable once created. `aircraft` is an owned copy taken at match time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Snapshot of the aircraft that triggered the alert.
    pub aircraft: Aircraft,
    /// Human-readable alert text.
    pub message: String,
    /// The criterion that triggered this alert.
    #[serde(rename = "criteria")]
    pub criterion: AlertCriterion,
    /// When the alert was raised.
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Raise an alert for `aircraft` matched by `criterion`.
    pub fn raise(aircraft: &Aircraft, criterion: &AlertCriterion, raised_at: DateTime<Utc>) -> Self {
        Self {
            aircraft: aircraft.clone(),
            message: format!(
                "Monitored aircraft detected: {} ({})",
                aircraft.callsign, aircraft.icao
            ),
            criterion: criterion.clone(),
            timestamp: raised_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

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

    #[test]
    fn icao_criterion_ignores_callsign() {
        let c = AlertCriterion::by_icao("AABBCC");
        assert!(c.matches(&aircraft("AABBCC", "ANY1")));
        assert!(!c.matches(&aircraft("DDEEFF", "ANY1")));
    }

    #[test]
    fn callsign_criterion_ignores_icao() {
        let c = AlertCriterion::by_callsign("TARGET1");
        assert!(c.matches(&aircraft("123456", "TARGET1")));
        assert!(!c.matches(&aircraft("123456", "OTHER")));
    }

    #[test]
    fn populated_fields_are_ored() {
        let c = AlertCriterion {
            icao: Some("AABBCC".to_owned()),
            callsign: Some("X".to_owned()),
        };
        assert!(c.matches(&aircraft("AABBCC", "Y")));
        assert!(c.matches(&aircraft("000000", "X")));
        assert!(!c.matches(&aircraft("000000", "Y")));
    }

    #[test]
    fn empty_strings_never_match() {
        let c = AlertCriterion {
            icao: Some(String::new()),
            callsign: None,
        };
        assert!(c.is_empty());
        assert!(!c.matches(&aircraft("", "")));
        assert!(AlertCriterion::default().is_empty());
    }

    #[test]
    fn unpopulated_fields_are_omitted_on_the_wire() {
        let json = serde_json::to_string(&AlertCriterion::by_icao("AABBCC")).unwrap();
        assert_eq!(json, r#"{"icao":"AABBCC"}"#);
    }

    #[test]
    fn alert_copies_aircraft_and_names_criteria() {
        let mut source = aircraft("AABBCC", "SWA1");
        let alert = Alert::raise(&source, &AlertCriterion::by_icao("AABBCC"), Utc::now());
        source.callsign = "CHANGED".to_owned();

        assert_eq!(alert.aircraft.callsign, "SWA1");
        assert_eq!(alert.message, "Monitored aircraft detected: SWA1 (AABBCC)");

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["criteria"]["icao"], "AABBCC");
    }
}
