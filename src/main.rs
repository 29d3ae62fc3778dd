//! Tablet relay (v1)
//!
//! A discovery-and-forwarding relay built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Slave tablet                       RELAY                              Master tablet
//!                      ┌──────────────────────────────────────────┐
//!  POST /api/register  │  ┌──────────┐      ┌──────────────────┐  │
//!  ────────────────────┼─▶│ address  │─────▶│ master registry  │  │
//!                      │  │validator │      │  (single slot)   │  │
//!                      │  └──────────┘      └────────┬─────────┘  │
//!                      │                             │ resolve    │
//!  ANY /api/proxy/...  │  ┌──────────┐      ┌────────▼─────────┐  │
//!  send-to: master  ───┼─▶│translate │─────▶│    forwarder     │──┼──────▶ http://<ip>/...
//!                      │  └──────────┘      └────────┬─────────┘  │
//!  ◀───────────────────┼─────── relay ◀──────────────┘            │
//!                      └──────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```text
//! tablet-relay server 6010        # relay role
//! tablet-relay 6011               # slave role on 6011
//! tablet-relay client             # slave role, port from $PORT or 6010
//! tablet-relay server --config relay.toml
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;

use tablet_relay::config::{self, ConfigError, Mode, RelayConfig};
use tablet_relay::http::HttpServer;
use tablet_relay::lifecycle::{signals, Shutdown};
use tablet_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tablet-relay")]
#[command(version, about = "Discovery-and-forwarding relay for tablets on a local network", long_about = None)]
struct Cli {
    /// `server` or `client`, and/or a listening port, in any order.
    #[arg(value_name = "MODE|PORT", value_parser = parse_positional)]
    args: Vec<Positional>,

    /// Listening port when none is given positionally.
    #[arg(long, env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,
}

/// A bare command-line word: a role or a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Positional {
    Mode(Mode),
    Port(u16),
}

fn parse_positional(arg: &str) -> Result<Positional, String> {
    if let Ok(port) = arg.parse::<u16>() {
        return match port {
            0 => Err("port must be between 1 and 65535".to_string()),
            port => Ok(Positional::Port(port)),
        };
    }
    <Mode as ValueEnum>::from_str(arg, true)
        .map(Positional::Mode)
        .map_err(|_| format!("expected `server`, `client` or a port, got {arg:?}"))
}

impl Cli {
    /// `server` anywhere selects server mode; the first port wins.
    fn positionals(&self) -> (Option<Mode>, Option<u16>) {
        let mode = self
            .args
            .iter()
            .filter_map(|arg| match arg {
                Positional::Mode(mode) => Some(*mode),
                Positional::Port(_) => None,
            })
            .max_by_key(|mode| *mode == Mode::Server);
        let port = self.args.iter().find_map(|arg| match arg {
            Positional::Port(port) => Some(*port),
            Positional::Mode(_) => None,
        });
        (mode, port)
    }

    /// Load the file (if any), then apply command-line overrides.
    fn into_config(self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => RelayConfig::default(),
        };

        let (mode, port) = self.positionals();
        if let Some(mode) = mode {
            config.mode = mode;
        }
        if let Some(port) = port.or(self.port) {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }

        config::validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability);

    tracing::info!(mode = %config.mode, "tablet-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        proxy_prefix = %config.proxy.prefix,
        timeout_secs = config.proxy.timeout_secs,
        max_body_bytes = config.proxy.max_body_bytes,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        let addr: SocketAddr = addr.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
