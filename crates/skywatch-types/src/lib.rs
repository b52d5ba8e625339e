//! Shared type definitions for the Skywatch alert server.
//!
//! This crate is the single source of truth for the telemetry and alert
//! records that flow between the ingestion API, the matching engine, and
//! the live event stream. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the browser dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (connection identifiers)
//! - [`aircraft`] -- Telemetry records as received and as stored
//! - [`alert`] -- Watch criteria and the alerts they raise

pub mod aircraft;
pub mod alert;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use aircraft::{Aircraft, AircraftReport};
pub use alert::{Alert, AlertCriterion};
pub use ids::ClientId;

#[cfg(test)]
mod tests {
    //! Checks for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::ClientId::export_all();
        let _ = crate::aircraft::Aircraft::export_all();
        let _ = crate::alert::AlertCriterion::export_all();
        let _ = crate::alert::Alert::export_all();
    }
}
