//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    /// Role of this process (relay server or slave client).
    pub mode: Mode,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Proxy forwarding settings.
    pub proxy: ProxyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Which route set the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Relay: registration, proxy and hello routes.
    Server,
    /// Slave tablet: hello routes only.
    #[default]
    Client,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Server => write!(f, "Board Media Server - PROXY"),
            Mode::Client => write!(f, "CrewTablet Client"),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6010,
        }
    }
}

/// Proxy forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Path prefix routed to the proxy and removed before forwarding.
    pub prefix: String,

    /// Upstream timeout (whole exchange) in seconds.
    pub timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,

    /// Header naming the target alias or address.
    pub target_header: String,

    /// Header naming the calling device (logged only).
    pub sender_header: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/proxy".to_string(),
            timeout_secs: 30,
            max_body_bytes: 100 * 1024 * 1024, // 100MB
            target_header: "send-to".to_string(),
            sender_header: "sender".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Prometheus scrape endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_address: None,
        }
    }
}
