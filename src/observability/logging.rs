//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Honor `RUST_LOG`, falling back to the configured level
//! - Pick pretty or JSON output

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global subscriber. Call once, early in `main`.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("tablet_relay={level},tower_http={level}")
}
