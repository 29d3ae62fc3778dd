//! Address-resolving reverse proxy.
//!
//! # Data Flow
//! ```text
//! Inbound request (method, path, query, headers, raw body)
//!     → registry resolves `send-to` (alias or direct address)
//!     → translate.rs (strip prefix, filter headers, rebuild URL)
//!     → forward.rs (single attempt, timeout, full buffering)
//!     → relay.rs (status pass-through, header filter, raw bytes)
//!     → Client response
//! ```
//!
//! # Design Decisions
//! - Bodies are `Bytes` from end to end, never text
//! - Every failure ends as a distinct status, nothing escapes a request
//! - No shared state is touched once the outbound call starts

pub mod forward;
pub mod relay;
pub mod translate;

pub use forward::{Forwarder, ProxyOutcome};
pub use relay::{relay, RelayedResponse};
pub use translate::{InboundRequest, ProxyRequest, Translator};
