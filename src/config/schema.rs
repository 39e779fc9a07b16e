//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend server definitions, in routing order.
    pub backends: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Forwarding timeouts.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Routing algorithm name ("round-robin", "random").
    pub algorithm: String,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Listener port and logging in the older JSON layout.
    /// Folded into `listener` and `observability` on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerSection>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: Vec::new(),
            health_check: HealthCheckConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            algorithm: "round-robin".to_string(),
            observability: ObservabilityConfig::default(),
            load_balancer: None,
        }
    }
}

impl ProxyConfig {
    /// Move `load_balancer` settings into their native sections.
    ///
    /// The port replaces the port of `listener.bind_address`, keeping its host.
    pub fn fold_load_balancer_section(&mut self) {
        let Some(section) = self.load_balancer.take() else {
            return;
        };

        if let Some(port) = section.port {
            self.listener.bind_address = match self.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("0.0.0.0:{}", port),
            };
        }
        if let Some(level) = section.log_level {
            self.observability.log_level = level.to_ascii_lowercase();
        }
        if section.log_file.is_some() {
            self.observability.log_file = section.log_file;
        }
    }
}

/// `{"load_balancer": {"port", "log_file", "log_level"}}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadBalancerSection {
    pub port: Option<u16>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend host name or IP address.
    pub host: String,

    /// Backend TCP port.
    pub port: u16,

    /// Path probed by the health monitor.
    #[serde(default = "default_health_path", alias = "health_endpoint")]
    pub health_path: String,
}

impl BackendConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            health_path: default_health_path(),
        }
    }
}

fn default_health_path() -> String {
    "/health".to_string()
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Health check interval in seconds.
    #[serde(alias = "interval_seconds")]
    pub interval_secs: u64,

    /// Health check timeout in seconds.
    #[serde(alias = "timeout_seconds")]
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 1,
            timeout_secs: 1,
        }
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time for request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 5,
        }
    }
}

/// Limits applied to buffered bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request or response body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Also write logs to this file, without ANSI colours.
    pub log_file: Option<String>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
