//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Assemble registry, routing policy and forwarder from configuration
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, body limits)
//! - Spawn the health monitor and join it on shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig};
use crate::health::HealthMonitor;
use crate::http::forwarder::RequestForwarder;
use crate::lifecycle::ShutdownListener;
use crate::load_balancer::{Algorithm, BackendRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: RequestForwarder,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    registry: Arc<BackendRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Runs the same validation as the file loader.
    pub fn new(mut config: ProxyConfig) -> Result<Self, ConfigError> {
        config.fold_load_balancer_section();
        validate_config(&config).map_err(ConfigError::Validation)?;

        let algorithm: Algorithm = config.algorithm.parse()?;

        let registry = Arc::new(BackendRegistry::new(&config.backends));
        let policy = algorithm.build();
        let forwarder = RequestForwarder::new(
            registry.clone(),
            policy,
            &config.timeouts,
            config.limits.max_body_bytes,
        );

        tracing::info!(
            backends = registry.count(),
            algorithm = %algorithm,
            "Load balancer assembled"
        );

        let router = Self::build_router(&config, AppState { forwarder });
        Ok(Self {
            router,
            config,
            registry,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns once `shutdown` fires, in-flight requests have drained and the
    /// health monitor has stopped.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone())
            .spawn(shutdown.clone());

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let mut server_shutdown = shutdown.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_shutdown.triggered().await })
            .await;

        if result.is_err() && !shutdown.is_triggered() {
            monitor.abort();
        }
        if let Err(e) = monitor.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Health monitor panicked");
            }
        }

        tracing::info!("HTTP server stopped");
        result
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Shared backend registry.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }
}

/// Catch-all handler: every request is forwarded.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    state.forwarder.forward(addr, request).await
}
