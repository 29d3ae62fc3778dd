//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and proxy core produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (x-request-id) attached to every proxied-request log line
//! - Metrics are cheap and recorded even when no exporter is installed

pub mod logging;
pub mod metrics;
