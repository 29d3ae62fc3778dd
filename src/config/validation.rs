//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that header names and addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::RelayConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be between 1 and 65535")]
    InvalidPort,

    #[error("proxy.prefix {0:?} must start with '/', must not end with '/', and must not be '/'")]
    InvalidPrefix(String),

    #[error("proxy.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("proxy.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("proxy.{field} {value:?} is not a valid header name")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("proxy.target_header and proxy.sender_header must differ")]
    DuplicateRoutingHeader,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a config for semantic errors, collecting all of them.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    let prefix = &config.proxy.prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    if config.proxy.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let target = check_header("target_header", &config.proxy.target_header, &mut errors);
    let sender = check_header("sender_header", &config.proxy.sender_header, &mut errors);
    if let (Some(target), Some(sender)) = (target, sender) {
        if target == sender {
            errors.push(ValidationError::DuplicateRoutingHeader);
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_header(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<HeaderName> {
    match HeaderName::try_from(value) {
        Ok(name) => Some(name),
        Err(_) => {
            errors.push(ValidationError::InvalidHeaderName {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
