//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Health monitor, forwarder:
//!     → tracing events (logging.rs installs the subscriber)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Health transitions log at warn/info; individual probes at debug
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
