//! HTTP surface of the Skywatch alert server.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion** (`POST /api/aircraft`) for telemetry producers
//! - **Criteria management** (`GET`/`POST /api/alert-criteria`)
//! - **Alert history** (`GET /api/alerts`) and a status summary
//!   (`GET /api/status`)
//! - **Server-Sent Events** (`GET /api/events`) streaming every ingested
//!   record as `aircraftUpdate` and every raised alert as `alert`
//!
//! # Architecture
//!
//! Handlers share one [`AppState`]: the append-only
//! [`TelemetryStore`](skywatch_core::TelemetryStore) and a handle to the
//! broadcast hub. Each SSE connection is an independent
//! [`Subscription`](skywatch_core::Subscription) with its own bounded
//! queue; a connection that cannot keep up is cut off without slowing
//! ingestion or other viewers.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod stream;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::spawn_observer;
pub use state::AppState;
