//! Named events pushed to streaming clients.
//!
//! The payload is serialized once, when the event is built, and the
//! resulting [`StreamEvent`] is shared by every client queue it lands in.
//! A serialization failure surfaces here, before anything is broadcast.

use std::fmt;

use skywatch_types::{Aircraft, Alert};

/// The SSE event name a payload is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// One ingested telemetry record.
    AircraftUpdate,
    /// One alert raised by one matching criterion.
    Alert,
}

impl EventKind {
    /// The wire name used in the `event:` field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AircraftUpdate => "aircraftUpdate",
            Self::Alert => "alert",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A serialized, named event ready for fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    kind: EventKind,
    data: String,
}

impl StreamEvent {
    /// Build an `aircraftUpdate` event.
    pub fn aircraft_update(aircraft: &Aircraft) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: EventKind::AircraftUpdate,
            data: serde_json::to_string(aircraft)?,
        })
    }

    /// Build an `alert` event.
    pub fn alert(alert: &Alert) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: EventKind::Alert,
            data: serde_json::to_string(alert)?,
        })
    }

    /// The event name.
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// The JSON payload (single line).
    pub fn data(&self) -> &str {
        &self.data
    }
}
