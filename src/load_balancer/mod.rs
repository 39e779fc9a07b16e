//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → registry.rs (snapshot of healthy backends)
//!     → Apply routing policy (policy.rs):
//!         - round_robin.rs (rotate through backends)
//!         - random.rs (uniform pick)
//!     → Return chosen BackendView or RoutingError
//! ```
//!
//! # Design Decisions
//! - Registry owns backends; everyone else holds BackendId + BackendView
//! - Policy chosen once at assembly time, dispatched through `dyn RoutingPolicy`
//! - Unhealthy backends excluded before the policy sees the list

pub mod backend;
pub mod policy;
pub mod random;
pub mod registry;
pub mod round_robin;

pub use backend::{BackendId, BackendView, HealthState};
pub use policy::{Algorithm, RoutingError, RoutingPolicy};
pub use registry::{BackendRegistry, RegistryError};
