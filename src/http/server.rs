//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the route set for the configured mode
//! - Wire up middleware (tracing, request ID, body limit)
//! - Bind server to listener
//! - Shut down gracefully on signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, Mode, ProxyConfig, RelayConfig};
use crate::http::handlers;
use crate::http::request::{mark_caller_request_id, X_REQUEST_ID};
use crate::proxy::{Forwarder, Translator};
use crate::registry::MasterRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MasterRegistry>,
    pub translator: Arc<Translator>,
    pub forwarder: Forwarder,
    pub config: Arc<RelayConfig>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    registry: Arc<MasterRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server with an empty registry.
    ///
    /// `config` is expected to have passed [`validate_config`]; use
    /// [`HttpServer::try_new`] for configs built in code.
    pub fn new(config: RelayConfig) -> Self {
        Self::with_registry(config, Arc::new(MasterRegistry::new()))
    }

    /// Validate `config`, then create the server.
    pub fn try_new(config: RelayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(Self::new(config))
    }

    /// Create a server sharing an existing registry.
    pub fn with_registry(config: RelayConfig, registry: Arc<MasterRegistry>) -> Self {
        let state = AppState {
            registry: registry.clone(),
            translator: Arc::new(Translator::from_config(&config.proxy)),
            forwarder: Forwarder::new(Duration::from_secs(config.proxy.timeout_secs)),
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let routes = match config.mode {
            Mode::Server => Self::server_routes(&config.proxy),
            Mode::Client => Self::client_routes(),
        };

        routes
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(middleware::from_fn(mark_caller_request_id))
    }

    /// Relay role: registration, proxy, hello.
    fn server_routes(proxy: &ProxyConfig) -> Router<AppState> {
        let forward = any(handlers::proxy).layer(DefaultBodyLimit::max(proxy.max_body_bytes));

        Router::new()
            .route("/api/hello", get(handlers::hello))
            .route("/api/register", post(handlers::register))
            .route(
                "/api/master-tablet/register",
                post(handlers::register).get(handlers::registration_status),
            )
            .route(&proxy.prefix, forward.clone())
            .route(&format!("{}/", proxy.prefix), forward.clone())
            .route(&format!("{}/{{*path}}", proxy.prefix), forward)
    }

    /// Slave role: hello endpoints only.
    fn client_routes() -> Router<AppState> {
        Router::new()
            .route("/api/hello", get(handlers::hello))
            .route("/api/slave/hello", get(handlers::slave_hello))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with state applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the shared registry.
    pub fn registry(&self) -> Arc<MasterRegistry> {
        self.registry.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
