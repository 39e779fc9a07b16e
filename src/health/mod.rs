//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (monitor.rs):
//!     Timer
//!     → Probe each backend sequentially
//!     → BackendRegistry::set_health
//!     → Log transition if the flag flipped
//! ```
//!
//! # State machine
//! ```text
//! HEALTHY ⇄ UNHEALTHY   (initial: HEALTHY, no terminal state)
//! ```
//!
//! # Design Decisions
//! - A single probe decides the state; no thresholds
//! - Only the monitor flips health flags; forwarding failures do not
//! - Probe errors never escape the loop

pub mod monitor;

pub use monitor::{CycleOutcome, HealthMonitor, ProbeOutcome};
