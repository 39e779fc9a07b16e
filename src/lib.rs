//! HTTP load balancer library.
//!
//! Proxies requests across a fixed set of backends, probes their health in
//! the background and tags response bodies with the backend that served them.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
