//! Uniform random load balancing strategy.

use crate::load_balancer::backend::BackendView;
use crate::load_balancer::policy::{RoutingError, RoutingPolicy};

/// Picks a candidate uniformly at random. Holds no state.
#[derive(Debug, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl RoutingPolicy for RandomPolicy {
    fn select<'a>(&self, candidates: &'a [BackendView]) -> Result<&'a BackendView, RoutingError> {
        if candidates.is_empty() {
            return Err(RoutingError::NoHealthyBackends);
        }
        Ok(&candidates[fastrand::usize(..candidates.len())])
    }

    fn reset(&self) {}

    fn name(&self) -> &'static str {
        "random"
    }
}
