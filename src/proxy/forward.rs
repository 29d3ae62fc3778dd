//! Single-shot forwarding to the resolved target.
//!
//! # Responsibilities
//! - Dispatch the outbound request over plain HTTP
//! - Buffer the full response body
//! - Bound the whole exchange with a timeout
//! - Classify the result into a [`ProxyOutcome`]
//!
//! # Design Decisions
//! - No retries; the caller owns retry policy
//! - Dropping the future (client went away) drops the pending upstream request

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::proxy::translate::ProxyRequest;

/// Result of one forwarding attempt.
#[derive(Debug, Clone)]
pub enum ProxyOutcome {
    /// Upstream answered with a non-error status.
    UpstreamResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// Upstream answered with a 4xx/5xx status.
    UpstreamErrorResponse {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// Request was sent but no complete response came back.
    NetworkFailure { message: String },
    /// Request could not be dispatched at all.
    RequestSetupFailure { message: String },
}

impl ProxyOutcome {
    /// Classify a received response by status.
    pub fn from_response(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        if status.is_success() || status.is_informational() || status.is_redirection() {
            ProxyOutcome::UpstreamResponse { status, headers, body }
        } else {
            ProxyOutcome::UpstreamErrorResponse { status, headers, body }
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyOutcome::UpstreamResponse { .. } => "upstream_response",
            ProxyOutcome::UpstreamErrorResponse { .. } => "upstream_error",
            ProxyOutcome::NetworkFailure { .. } => "network_failure",
            ProxyOutcome::RequestSetupFailure { .. } => "setup_failure",
        }
    }

    /// Status the client will eventually see.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyOutcome::UpstreamResponse { status, .. }
            | ProxyOutcome::UpstreamErrorResponse { status, .. } => *status,
            ProxyOutcome::NetworkFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyOutcome::RequestSetupFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Forwards [`ProxyRequest`]s with a pooled HTTP/1 client.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder whose exchanges give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward `request` once and classify what happened.
    pub async fn forward(&self, request: ProxyRequest) -> ProxyOutcome {
        let outbound = match request.into_http() {
            Ok(req) => req,
            Err(err) => {
                return ProxyOutcome::RequestSetupFailure {
                    message: err.to_string(),
                }
            }
        };

        match tokio::time::timeout(self.timeout, self.exchange(outbound)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(message)) => ProxyOutcome::NetworkFailure { message },
            Err(_) => ProxyOutcome::NetworkFailure {
                message: format!("timeout of {}ms exceeded", self.timeout.as_millis()),
            },
        }
    }

    async fn exchange(&self, request: axum::http::Request<Body>) -> Result<ProxyOutcome, String> {
        let response: hyper::Response<Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| error_chain(&e))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(|e| error_chain(&e))?;

        Ok(ProxyOutcome::from_response(parts.status, parts.headers, body))
    }
}

/// Render an error with its sources, e.g. `client error (Connect): tcp connect error: Connection refused`.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
