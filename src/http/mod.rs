//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route set per mode, middleware)
//!     → request.rs (request ID for log correlation)
//!     → handlers.rs (registration, proxy, hello)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{mark_caller_request_id, request_id, CallerRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
