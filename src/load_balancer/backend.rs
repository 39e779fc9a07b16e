//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track health state (Healthy/Unhealthy) and when it was last probed
//! - Hand out owned snapshots so callers never hold references into the registry

use std::fmt;
use std::time::Instant;

use crate::config::BackendConfig;

/// Stable handle to a backend: its position in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(usize);

impl BackendId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend-{}", self.0)
    }
}

/// Health state of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl HealthState {
    pub fn from_healthy(healthy: bool) -> Self {
        if healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthState::Healthy)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => f.write_str("HEALTHY"),
            HealthState::Unhealthy => f.write_str("UNHEALTHY"),
        }
    }
}

/// A single backend server, owned by the registry.
#[derive(Debug)]
pub(crate) struct BackendTarget {
    pub host: String,
    pub port: u16,
    pub health_path: String,
    pub healthy: bool,
    /// `None` until the first probe completes.
    pub last_check: Option<Instant>,
}

impl BackendTarget {
    /// Backends start healthy so traffic flows before the first probe.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            health_path: config.health_path.clone(),
            healthy: true,
            last_check: None,
        }
    }

    pub fn view(&self, id: BackendId) -> BackendView {
        BackendView {
            id,
            host: self.host.clone(),
            port: self.port,
            health_path: self.health_path.clone(),
            healthy: self.healthy,
            last_check: self.last_check,
        }
    }
}

/// Point-in-time copy of a backend, as returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendView {
    pub id: BackendId,
    pub host: String,
    pub port: u16,
    pub health_path: String,
    pub healthy: bool,
    pub last_check: Option<Instant>,
}

impl BackendView {
    /// `host:port`, suitable for a Host header or URI authority.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Absolute URL of the health endpoint.
    pub fn health_url(&self) -> String {
        format!("http://{}{}", self.authority(), self.health_path)
    }

    pub fn state(&self) -> HealthState {
        HealthState::from_healthy(self.healthy)
    }
}
