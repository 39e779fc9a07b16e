//! Request forwarding.
//!
//! # Responsibilities
//! - Pick a healthy backend through the routing policy
//! - Replay the inbound request against it within a bounded time
//! - Augment the buffered response body and hand it back to the client
//! - Map every failure to a 503 with a fixed JSON body
//!
//! # Design Decisions
//! - One attempt per request; failures never retry on another backend
//! - Forwarding failures never touch health flags; only the monitor does
//! - No keep-alive pool towards backends
//! - HEAD, 1xx/204/304 and content-encoded responses pass through untouched

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use axum::response::IntoResponse;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::Instrument;

use crate::config::TimeoutConfig;
use crate::http::error::ForwardError;
use crate::http::request::{forward_headers, RequestContext};
use crate::http::response::augment;
use crate::load_balancer::{BackendRegistry, BackendView, RoutingPolicy};
use crate::observability::metrics;

/// Content type assumed when a backend does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Stateless per-request orchestrator; cheap to share across tasks.
#[derive(Clone)]
pub struct RequestForwarder {
    registry: Arc<BackendRegistry>,
    policy: Arc<dyn RoutingPolicy>,
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl RequestForwarder {
    pub fn new(
        registry: Arc<BackendRegistry>,
        policy: Arc<dyn RoutingPolicy>,
        timeouts: &TimeoutConfig,
        max_body_bytes: usize,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            registry,
            policy,
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            max_body_bytes,
        }
    }

    /// Forward one inbound request and build the client response.
    pub async fn forward(&self, client_addr: SocketAddr, request: Request<Body>) -> Response<Body> {
        let mut ctx = RequestContext::new(
            client_addr,
            request.method().clone(),
            request.uri().path().to_string(),
        );
        let span = tracing::info_span!(
            "forward",
            request_id = %ctx.id,
            client = %ctx.client_addr,
            method = %ctx.method,
            path = %ctx.path,
        );

        async move {
            tracing::debug!("Request received");

            let healthy = self.registry.list_healthy();
            let backend = match self.policy.select(&healthy) {
                Ok(backend) => backend.clone(),
                Err(e) => {
                    tracing::error!(error = %e, "No backend selected");
                    metrics::record_request(ctx.method.as_str(), 503, "none", ctx.started);
                    return ForwardError::from(e).into_response();
                }
            };
            ctx.backend = Some(backend.id);
            tracing::debug!(backend = %backend.authority(), policy = self.policy.name(), "Selected backend");

            match self.exchange(&ctx, &backend, request).await {
                Ok(response) => {
                    let status = response.status();
                    tracing::info!(
                        backend = %backend.authority(),
                        status = status.as_u16(),
                        latency_ms = ctx.elapsed().as_millis() as u64,
                        "Request completed"
                    );
                    metrics::record_request(
                        ctx.method.as_str(),
                        status.as_u16(),
                        &backend.authority(),
                        ctx.started,
                    );
                    response
                }
                Err(e) => {
                    tracing::error!(
                        backend = %backend.authority(),
                        error = %e,
                        latency_ms = ctx.elapsed().as_millis() as u64,
                        "Forwarding failed"
                    );
                    metrics::record_request(
                        ctx.method.as_str(),
                        e.status_code().as_u16(),
                        &backend.authority(),
                        ctx.started,
                    );
                    e.into_response()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Send the request, read the whole response, augment it.
    async fn exchange(
        &self,
        ctx: &RequestContext,
        backend: &BackendView,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let authority = backend.authority();
        let upstream = self.build_upstream(ctx, backend, request)?;

        let timeout_secs = self.request_timeout.as_secs();
        let (parts, body) = match time::timeout(self.request_timeout, self.send(upstream)).await {
            Ok(result) => result.map_err(|e| e.with_backend(&authority))?,
            Err(_) => {
                return Err(ForwardError::BackendTimeout {
                    backend: authority,
                    timeout_secs,
                })
            }
        };

        let augmented = if leaves_body_alone(&ctx.method, parts.status, &parts.headers) {
            None
        } else {
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(DEFAULT_CONTENT_TYPE);
            match augment(&body, content_type, backend.port) {
                Cow::Borrowed(_) => None,
                Cow::Owned(bytes) => Some(bytes),
            }
        };

        let mut response = Response::from_parts(parts, Body::empty());

        let body = match augmented {
            None => body,
            Some(bytes) => {
                let headers = response.headers_mut();
                headers.remove(header::TRANSFER_ENCODING);
                headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                Bytes::from(bytes)
            }
        };

        *response.body_mut() = Body::from(body);
        Ok(response)
    }

    fn build_upstream(
        &self,
        ctx: &RequestContext,
        backend: &BackendView,
        request: Request<Body>,
    ) -> Result<Request<Body>, ForwardError> {
        let authority = backend.authority();
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        parts.uri = Uri::builder()
            .scheme("http")
            .authority(authority.as_str())
            .path_and_query(path_and_query)
            .build()
            .map_err(|e| ForwardError::Internal {
                backend: authority.clone(),
                reason: e.to_string(),
            })?;
        parts.version = Version::HTTP_11;
        forward_headers(&mut parts.headers, &authority, &ctx.id);

        Ok(Request::from_parts(parts, body))
    }

    /// Transport leg: send and collect. Errors carry no backend name yet.
    async fn send(
        &self,
        request: Request<Body>,
    ) -> Result<(axum::http::response::Parts, Bytes), SendError> {
        let response: Response<Incoming> = self
            .client
            .request(request)
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let (parts, incoming) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(incoming), self.max_body_bytes)
            .await
            .map_err(|e| SendError::Body(e.to_string()))?;
        Ok((parts, body))
    }
}

/// Responses relayed byte for byte: bodiless by definition, or encoded.
fn leaves_body_alone(method: &Method, status: StatusCode, headers: &HeaderMap) -> bool {
    if *method == Method::HEAD
        || status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
    {
        return true;
    }

    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .flat_map(|v| v.to_str().unwrap_or("unknown").split(','))
        .any(|coding| !coding.trim().eq_ignore_ascii_case("identity"))
}

enum SendError {
    Transport(String),
    Body(String),
}

impl SendError {
    fn with_backend(self, backend: &str) -> ForwardError {
        match self {
            SendError::Transport(reason) => ForwardError::BackendUnreachable {
                backend: backend.to_string(),
                reason,
            },
            SendError::Body(reason) => ForwardError::Internal {
                backend: backend.to_string(),
                reason,
            },
        }
    }
}
