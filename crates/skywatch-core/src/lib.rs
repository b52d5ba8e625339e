//! Core of the Skywatch alert server.
//!
//! Telemetry flows through this crate in one direction:
//!
//! ```text
//! ingestion --> matcher (criteria snapshot) --> store (append alerts)
//!           --> hub.broadcast(aircraftUpdate), hub.broadcast(alert)*
//!           --> every registered client's bounded outbound queue
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`matcher`] -- pure criterion evaluation
//! - [`store`] -- append-only criteria list and alert log
//! - [`event`] -- named stream events and their wire framing
//! - [`hub`] -- the single-owner client set and fan-out actor

pub mod config;
pub mod event;
pub mod hub;
pub mod matcher;
pub mod store;

pub use config::{ConfigError, SkywatchConfig};
pub use event::{EventKind, StreamEvent};
pub use hub::{ClientRegistration, Hub, HubError, HubHandle, Subscription};
pub use store::TelemetryStore;
