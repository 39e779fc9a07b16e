//! Backend registry.
//!
//! # Responsibilities
//! - Own the fixed, ordered set of backends built from configuration
//! - Serve snapshots of all / healthy backends to concurrent readers
//! - Apply health updates from the health monitor
//!
//! # Design Decisions
//! - Registration order is canonical; listings filter, never reorder
//! - Many readers proceed in parallel; a health update takes the lock exclusively
//! - Callers receive owned `BackendView`s, never references into the lock

use parking_lot::RwLock;
use std::time::Instant;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::load_balancer::backend::{BackendId, BackendTarget, BackendView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("backend index {index} out of range (registry holds {count})")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Thread-safe registry of backend targets.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: RwLock<Vec<BackendTarget>>,
}

impl BackendRegistry {
    /// Create a registry from configuration, preserving order.
    pub fn new(configs: &[BackendConfig]) -> Self {
        let backends = configs.iter().map(BackendTarget::from_config).collect();
        Self {
            backends: RwLock::new(backends),
        }
    }

    /// Snapshot of every backend in registration order.
    pub fn list_all(&self) -> Vec<BackendView> {
        self.read(|backends| {
            backends
                .iter()
                .enumerate()
                .map(|(i, b)| b.view(BackendId::new(i)))
                .collect()
        })
    }

    /// Snapshot of the currently healthy backends in registration order.
    ///
    /// The result may be stale as soon as it is returned.
    pub fn list_healthy(&self) -> Vec<BackendView> {
        self.read(|backends| {
            backends
                .iter()
                .enumerate()
                .filter(|(_, b)| b.healthy)
                .map(|(i, b)| b.view(BackendId::new(i)))
                .collect()
        })
    }

    /// Snapshot of a single backend.
    pub fn get(&self, id: BackendId) -> Option<BackendView> {
        self.read(|backends| backends.get(id.index()).map(|b| b.view(id)))
    }

    /// Record a probe result. Returns the previous health flag.
    pub fn set_health(&self, id: BackendId, healthy: bool) -> Result<bool, RegistryError> {
        self.write(id, |backend| {
            let previous = backend.healthy;
            backend.healthy = healthy;
            backend.last_check = Some(Instant::now());
            previous
        })
    }

    /// Number of registered backends. Constant for the registry's lifetime.
    pub fn count(&self) -> usize {
        self.read(|backends| backends.len())
    }

    fn read<T>(&self, f: impl FnOnce(&[BackendTarget]) -> T) -> T {
        let guard = self.backends.read();
        f(&guard)
    }

    fn write<T>(
        &self,
        id: BackendId,
        f: impl FnOnce(&mut BackendTarget) -> T,
    ) -> Result<T, RegistryError> {
        let mut guard = self.backends.write();
        let count = guard.len();
        match guard.get_mut(id.index()) {
            Some(backend) => Ok(f(backend)),
            None => Err(RegistryError::IndexOutOfRange {
                index: id.index(),
                count,
            }),
        }
    }
}
