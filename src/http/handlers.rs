//! Route handlers.
//!
//! Registration and proxy handlers run in server mode; the hello handlers are
//! plain liveness answers with no state.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;
use crate::http::request::{request_id, CallerRequestId, X_REQUEST_ID};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{relay, InboundRequest, ProxyOutcome, RelayedResponse};

/// `{ "payload": { "ip": "..." } }`
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub payload: Option<RegisterPayload>,
}

/// `ip` is taken as any JSON value; non-strings are stringified and then fail
/// address validation rather than being treated as missing.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub ip: Option<Value>,
}

impl RegisterPayload {
    /// The candidate address, or `None` if absent, null or empty.
    fn candidate(self) -> Option<String> {
        let ip = match self.ip? {
            Value::Null => return None,
            Value::String(ip) => ip,
            other => other.to_string(),
        };
        (!ip.is_empty()).then_some(ip)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    pub success: bool,
    pub ip: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub is_registered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlaveHello {
    pub time: String,
}

/// Register the calling tablet as master.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, RelayError> {
    let ip = match payload {
        Ok(Json(request)) => request.payload.and_then(RegisterPayload::candidate),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable registration body");
            None
        }
    };

    let Some(ip) = ip else {
        tracing::warn!("Registration without ip");
        metrics::record_registration("rejected");
        return Err(RelayError::InvalidInput("Missing ip in payload".to_string()));
    };

    match state.registry.register(&ip) {
        Ok(ip) => {
            metrics::record_registration("ok");
            Ok(Json(RegisterResponse { success: true, ip }))
        }
        Err(err) => {
            tracing::warn!(ip = %ip, "Rejected master registration");
            metrics::record_registration("rejected");
            Err(err)
        }
    }
}

/// Report whether a master is registered.
pub async fn registration_status(State(state): State<AppState>) -> Json<RegistrationStatus> {
    Json(RegistrationStatus {
        is_registered: state.registry.is_registered(),
    })
}

/// Forward any request under the proxy prefix to its target.
///
/// A request ID generated by the relay is logged but not forwarded.
pub async fn proxy(
    State(state): State<AppState>,
    Extension(CallerRequestId(caller_id)): Extension<CallerRequestId>,
    method: Method,
    uri: Uri,
    mut headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers).to_string();
    if !caller_id {
        headers.remove(X_REQUEST_ID);
    }
    let method_label = method.to_string();
    let inbound = InboundRequest {
        method,
        uri,
        headers,
        body,
    };

    let (outcome, response) = match dispatch(&state, &request_id, inbound).await {
        Ok(outcome) => (outcome.kind(), relay(outcome)),
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "Proxy request rejected");
            ("rejected", RelayedResponse::from_error(&err))
        }
    };

    metrics::record_request(&method_label, response.status.as_u16(), outcome, start);
    response.into_response()
}

/// Resolve, translate and forward; registry access ends before the network call.
async fn dispatch(
    state: &AppState,
    request_id: &str,
    inbound: InboundRequest,
) -> Result<ProxyOutcome, RelayError> {
    let config = &state.config.proxy;

    let sender = header_value(&inbound.headers, &config.sender_header)
        .unwrap_or("unknown")
        .to_string();
    let target = header_value(&inbound.headers, &config.target_header)
        .ok_or_else(|| RelayError::MissingTarget(config.target_header.clone()))?;
    let address = state.registry.resolve(target)?;

    let request = state.translator.translate(inbound, address);
    tracing::info!(
        request_id = %request_id,
        sender = %sender,
        method = %request.method,
        target = %request.target,
        path = %request.path,
        "Proxying request"
    );

    let outcome = state.forwarder.forward(request).await;
    match &outcome {
        ProxyOutcome::NetworkFailure { message } => {
            tracing::error!(request_id = %request_id, error = %message, "Target request failed");
        }
        ProxyOutcome::RequestSetupFailure { message } => {
            tracing::error!(request_id = %request_id, error = %message, "Proxy setup failed");
        }
        other => {
            tracing::debug!(
                request_id = %request_id,
                status = %other.status(),
                outcome = other.kind(),
                "Upstream responded"
            );
        }
    }

    Ok(outcome)
}

/// First value of `name`, if present, valid text and non-empty.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Fixed greeting.
pub async fn hello() -> &'static str {
    "Hello"
}

/// Slave-side liveness answer with the current time.
pub async fn slave_hello() -> Json<SlaveHello> {
    tracing::info!("Slave hello");
    Json(SlaveHello {
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
