//! Tablet discovery-and-forwarding relay.
//!
//! One tablet registers itself as master; others send requests addressed to
//! `master` through the relay, which resolves the alias and forwards them,
//! binary payloads included.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod registry;

pub use config::RelayConfig;
pub use error::RelayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::MasterRegistry;
