//! Forwarding errors and their client-facing responses.
//!
//! Every variant becomes a 503 with a fixed JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::load_balancer::RoutingError;

pub const NO_HEALTHY_BACKENDS: &str = "No healthy backends available";
pub const BACKEND_CONNECTION_FAILED: &str = "Backend connection failed";
pub const BACKEND_REQUEST_FAILED: &str = "Backend request failed";

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("No healthy backends available")]
    NoHealthyBackends,

    #[error("backend {backend} unreachable: {reason}")]
    BackendUnreachable { backend: String, reason: String },

    #[error("backend {backend} timed out after {timeout_secs}s")]
    BackendTimeout { backend: String, timeout_secs: u64 },

    #[error("request to backend {backend} failed: {reason}")]
    Internal { backend: String, reason: String },
}

impl From<RoutingError> for ForwardError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::NoHealthyBackends => ForwardError::NoHealthyBackends,
        }
    }
}

impl ForwardError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::SERVICE_UNAVAILABLE
    }

    /// Message placed in the response body.
    pub fn client_message(&self) -> &'static str {
        match self {
            ForwardError::NoHealthyBackends => NO_HEALTHY_BACKENDS,
            ForwardError::BackendUnreachable { .. } | ForwardError::BackendTimeout { .. } => {
                BACKEND_CONNECTION_FAILED
            }
            ForwardError::Internal { .. } => BACKEND_REQUEST_FAILED,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorBody {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}
