//! Request-level error taxonomy.
//!
//! Every failure a single request can hit is one of these variants. Each maps
//! to a fixed status code and a JSON body of the form `{ "error": ... }`, so a
//! handler can bail out with `?` and the client still gets a well-formed answer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::proxy::relay::RelayedResponse;

/// Errors surfaced to relay clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Registration payload is malformed or incomplete.
    #[error("{0}")]
    InvalidInput(String),

    /// Candidate master address failed validation.
    #[error(
        "Invalid IP address format. Expected format: IP or IP:PORT or localhost or localhost:PORT \
         (e.g., 192.168.1.1, 192.168.1.1:8080, localhost, localhost:8080)"
    )]
    InvalidAddress(String),

    /// The routing header naming the target is absent or empty.
    #[error("Empty target IP ({0})")]
    MissingTarget(String),

    /// The `master` alias was requested before anyone registered.
    #[error("Master tablet IP not registered")]
    Unregistered,

    /// The request left the relay but no response came back.
    #[error("{0}")]
    UpstreamUnreachable(String),

    /// The outbound request could not be built or dispatched.
    #[error("{0}")]
    Setup(String),
}

impl RelayError {
    /// Status code returned to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidInput(_) | RelayError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            RelayError::MissingTarget(_) | RelayError::Unregistered => StatusCode::NOT_FOUND,
            RelayError::UpstreamUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON payload describing the failure.
    pub fn body(&self) -> serde_json::Value {
        match self {
            RelayError::UpstreamUnreachable(message) => json!({
                "error": "Target unavailable",
                "message": message,
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        RelayedResponse::from_error(&self).into_response()
    }
}
