//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests
//!     → Stop health monitor → Join → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Shutdown is an explicit value passed to each task, not a global flag
//! - Background tasks are joined before the state they use is dropped

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
