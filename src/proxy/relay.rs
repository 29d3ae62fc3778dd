//! Forwarding outcome → client response.
//!
//! # Responsibilities
//! - Pass upstream status codes through untouched
//! - Strip framing headers the relay re-does itself
//! - Return upstream bodies as raw bytes, whatever the content type
//! - Render relay-side failures as JSON error payloads

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::RelayError;
use crate::proxy::forward::ProxyOutcome;

/// Upstream response headers that are not relayed.
const STRIPPED_RESPONSE_HEADERS: [HeaderName; 3] = [
    header::TRANSFER_ENCODING,
    header::CONNECTION,
    header::CONTENT_ENCODING,
];

/// A response ready to go back to the client.
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RelayedResponse {
    /// JSON error response for a relay-side failure.
    pub fn from_error(err: &RelayError) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            status: err.status(),
            headers,
            body: Bytes::from(err.body().to_string()),
        }
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Map a forwarding outcome to the response sent back to the client.
pub fn relay(outcome: ProxyOutcome) -> RelayedResponse {
    match outcome {
        ProxyOutcome::UpstreamResponse { status, headers, body }
        | ProxyOutcome::UpstreamErrorResponse { status, headers, body } => RelayedResponse {
            status,
            headers: filter_response_headers(headers),
            body,
        },
        ProxyOutcome::NetworkFailure { message } => {
            RelayedResponse::from_error(&RelayError::UpstreamUnreachable(message))
        }
        ProxyOutcome::RequestSetupFailure { message } => {
            RelayedResponse::from_error(&RelayError::Setup(message))
        }
    }
}

fn filter_response_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in &STRIPPED_RESPONSE_HEADERS {
        headers.remove(name);
    }
    headers
}
