//! Routing policy capability and algorithm selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::load_balancer::backend::BackendView;
use crate::load_balancer::random::RandomPolicy;
use crate::load_balancer::round_robin::RoundRobin;

/// Returned by a policy when it has nothing to choose from.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("No healthy backends available")]
    NoHealthyBackends,
}

/// Strategy that picks one backend out of a candidate snapshot.
///
/// Implementations must be safe to call concurrently without external locking.
pub trait RoutingPolicy: Send + Sync + fmt::Debug {
    /// Choose a backend from `candidates`.
    fn select<'a>(&self, candidates: &'a [BackendView]) -> Result<&'a BackendView, RoutingError>;

    /// Return the policy to its initial state.
    fn reset(&self);

    /// Name used in logs.
    fn name(&self) -> &'static str;
}

/// Routing algorithms that can be named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    RoundRobin,
    Random,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("routing algorithm '{0}' is not supported (supported: round-robin, random)")]
    Unsupported(String),

    #[error("unknown routing algorithm '{0}' (supported: round-robin, random)")]
    Unknown(String),
}

impl FromStr for Algorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "round-robin" | "roundrobin" => Ok(Algorithm::RoundRobin),
            "random" => Ok(Algorithm::Random),
            "least-connections" | "least-conn" | "weighted" | "weighted-round-robin" => {
                Err(AlgorithmError::Unsupported(s.to_string()))
            }
            _ => Err(AlgorithmError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::RoundRobin => f.write_str("round-robin"),
            Algorithm::Random => f.write_str("random"),
        }
    }
}

impl Algorithm {
    /// Instantiate the policy for this algorithm.
    pub fn build(self) -> Arc<dyn RoutingPolicy> {
        match self {
            Algorithm::RoundRobin => Arc::new(RoundRobin::new()),
            Algorithm::Random => Arc::new(RandomPolicy::new()),
        }
    }
}
