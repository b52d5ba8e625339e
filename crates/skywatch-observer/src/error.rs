//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A request body could not be decoded or failed validation.
    ///
    /// Carries the client-facing message; nothing was changed.
    #[error("{0}")]
    InvalidPayload(&'static str),

    /// The event stream could not be opened; the connection never joined
    /// the hub.
    #[error("streaming unavailable: {0}")]
    StreamUnavailable(#[from] skywatch_core::HubError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidPayload(msg) => (StatusCode::BAD_REQUEST, (*msg).to_owned()),
            Self::StreamUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Streaming unsupported!".to_owned(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
