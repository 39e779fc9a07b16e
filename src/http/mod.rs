//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route)
//!     → forwarder.rs (select backend, replay request)
//!     → request.rs (request context, header rewrite)
//!     → response.rs (embed backend identity in body)
//!     → error.rs (503 JSON bodies on failure)
//!     → Send to client
//! ```

pub mod error;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use error::ForwardError;
pub use forwarder::RequestForwarder;
pub use request::{RequestContext, X_REQUEST_ID};
pub use response::augment;
pub use server::HttpServer;
