//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend, one at a time, in registry order
//! - Write results into the registry
//! - Log state transitions loudly and individual probes quietly

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::Instrument;

use crate::config::HealthCheckConfig;
use crate::lifecycle::ShutdownListener;
use crate::load_balancer::{BackendRegistry, BackendView, HealthState};
use crate::observability::metrics;

const USER_AGENT: &str = "http-balancer-health-check";

/// Result of probing one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx response.
    Healthy(StatusCode),
    /// Any other status.
    BadStatus(StatusCode),
    /// Could not connect or the exchange failed.
    ConnectFailed(String),
    /// No response within the probe timeout.
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy(_))
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Healthy(status) => write!(f, "status {}", status.as_u16()),
            ProbeOutcome::BadStatus(status) => write!(f, "non-success status {}", status.as_u16()),
            ProbeOutcome::ConnectFailed(reason) => write!(f, "connection error: {}", reason),
            ProbeOutcome::TimedOut => f.write_str("timeout"),
        }
    }
}

/// Whether a cycle ran to the end or was cut short by shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed,
    Stopped,
}

pub struct HealthMonitor {
    registry: Arc<BackendRegistry>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<BackendRegistry>, config: HealthCheckConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeout_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            registry,
            config,
            client,
        }
    }

    /// Run the monitor on its own task.
    pub fn spawn(self, shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: ShutdownListener) {
        let span = tracing::info_span!("health_monitor");
        self.run_loop(shutdown).instrument(span).await
    }

    async fn run_loop(self, mut shutdown: ShutdownListener) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_secs = self.config.timeout_secs,
            backends = self.registry.count(),
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.config.interval_secs);

        loop {
            if shutdown.is_triggered() {
                break;
            }

            tracing::debug!("Starting health check cycle");
            if self.run_cycle(&mut shutdown).await == CycleOutcome::Stopped {
                break;
            }

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = shutdown.triggered() => break,
            }
        }

        tracing::info!("Health monitor stopped");
    }

    /// Probe every backend once, in registry order.
    ///
    /// Shutdown is checked before each probe and aborts an in-flight one.
    pub async fn run_cycle(&self, shutdown: &mut ShutdownListener) -> CycleOutcome {
        for backend in self.registry.list_all() {
            if shutdown.is_triggered() {
                return CycleOutcome::Stopped;
            }

            let started = Instant::now();
            let outcome = tokio::select! {
                outcome = self.probe(&backend) => outcome,
                _ = shutdown.triggered() => return CycleOutcome::Stopped,
            };
            self.record(&backend, &outcome, started.elapsed());
        }
        CycleOutcome::Completed
    }

    /// Issue one health request. Every failure mode maps to an unhealthy outcome.
    pub async fn probe(&self, backend: &BackendView) -> ProbeOutcome {
        let request = match Request::builder()
            .method("GET")
            .uri(backend.health_url())
            .header(header::HOST, backend.authority())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => return ProbeOutcome::ConnectFailed(e.to_string()),
        };

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match time::timeout(timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status().is_success() => {
                ProbeOutcome::Healthy(response.status())
            }
            Ok(Ok(response)) => ProbeOutcome::BadStatus(response.status()),
            Ok(Err(e)) => ProbeOutcome::ConnectFailed(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }

    fn record(&self, backend: &BackendView, outcome: &ProbeOutcome, elapsed: Duration) {
        let healthy = outcome.is_healthy();
        let addr = backend.authority();

        let previous = match self.registry.set_health(backend.id, healthy) {
            Ok(previous) => previous,
            Err(e) => {
                tracing::warn!(backend = %addr, error = %e, "Failed to record health check");
                return;
            }
        };

        tracing::debug!(
            backend = %addr,
            state = %HealthState::from_healthy(healthy),
            latency_ms = elapsed.as_millis() as u64,
            result = %outcome,
            "Health check"
        );
        metrics::record_backend_health(&addr, healthy);

        if previous != healthy {
            let from = HealthState::from_healthy(previous);
            let to = HealthState::from_healthy(healthy);
            if healthy {
                tracing::info!(backend = %addr, %from, %to, "Backend state changed");
            } else {
                tracing::warn!(backend = %addr, %from, %to, reason = %outcome, "Backend state changed");
            }
            metrics::record_health_transition(&addr, healthy);
        }
    }
}
