//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID for log correlation
//! - Capture the per-request context (client, method, path, timing, backend)
//! - Prepare request headers for forwarding to a backend
//!
//! # Design Decisions
//! - Context lives only for one request/response cycle and is never shared
//! - Host is rewritten to the backend; every other header is preserved

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::load_balancer::BackendId;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request state owned by the forwarder.
#[derive(Debug)]
pub struct RequestContext {
    pub id: Uuid,
    pub client_addr: SocketAddr,
    pub method: Method,
    pub path: String,
    pub started: Instant,
    pub backend: Option<BackendId>,
}

impl RequestContext {
    pub fn new(client_addr: SocketAddr, method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_addr,
            method,
            path: path.into(),
            started: Instant::now(),
            backend: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Prepare inbound headers for the backend.
///
/// Keeps an inbound `x-request-id` if present, otherwise stamps ours.
pub fn forward_headers(headers: &mut HeaderMap, authority: &str, request_id: &Uuid) {
    if let Ok(host) = HeaderValue::from_str(authority) {
        headers.insert(header::HOST, host);
    }
    if !headers.contains_key(&X_REQUEST_ID) {
        if let Ok(id) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert(X_REQUEST_ID, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_headers_rewrites_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("balancer.local"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let id = Uuid::new_v4();
        forward_headers(&mut headers, "127.0.0.1:8080", &id);

        assert_eq!(headers[header::HOST], "127.0.0.1:8080");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(headers[&X_REQUEST_ID], id.to_string().as_str());
    }

    #[test]
    fn test_forward_headers_keeps_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("upstream-id"));

        forward_headers(&mut headers, "localhost:8081", &Uuid::new_v4());
        assert_eq!(headers[&X_REQUEST_ID], "upstream-id");
    }

    #[test]
    fn test_context_starts_without_backend() {
        let ctx = RequestContext::new("127.0.0.1:5000".parse().unwrap(), Method::GET, "/a");
        assert!(ctx.backend.is_none());
        assert_eq!(ctx.path, "/a");
    }
}
