//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::load_balancer::backend::BackendView;
use crate::load_balancer::policy::{RoutingError, RoutingPolicy};

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
///
/// The candidate list is a fresh snapshot on every call, so when backends
/// flap the rotation shifts and fairness is only approximate.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutingPolicy for RoundRobin {
    fn select<'a>(&self, candidates: &'a [BackendView]) -> Result<&'a BackendView, RoutingError> {
        if candidates.is_empty() {
            return Err(RoutingError::NoHealthyBackends);
        }

        let count = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(&candidates[count % candidates.len()])
    }

    fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "round-robin"
    }
}
