//! Request identification.
//!
//! # Responsibilities
//! - Name the request ID header shared by the middleware stack
//! - Read the ID back inside handlers for log correlation
//! - Remember whether the caller sent the ID, so a generated one stays local
//!
//! # Design Decisions
//! - ID assigned as early as possible (outermost layer) so traces carry it
//! - An ID supplied by the caller is kept, not replaced
//! - The same ID is echoed on the response

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request extension: true if `x-request-id` came from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerRequestId(pub bool);

/// Runs outside the ID layer and records whether the caller supplied an ID.
pub async fn mark_caller_request_id(mut request: Request, next: Next) -> Response {
    let supplied = request.headers().contains_key(X_REQUEST_ID);
    request.extensions_mut().insert(CallerRequestId(supplied));
    next.run(request).await
}

/// The request's correlation ID, or `"unknown"` outside the ID layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
