//! Sample upstream server for trying the balancer locally.
//!
//! Serves `/health`, an HTML page at `/page`, plain text at `/text`, and
//! echoes every other request back as JSON.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use http_balancer::lifecycle::signals;
use http_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "demo-backend")]
#[command(about = "Demo upstream server for http-balancer", long_about = None)]
struct Cli {
    /// Port to listen on
    port: u16,

    /// Bind host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[derive(Clone, Copy)]
struct BackendState {
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init("info", None)?;

    let state = BackendState { port: cli.port };
    let app = Router::new()
        .route("/health", get(health))
        .route("/page", get(page))
        .route("/text", get(text))
        .fallback(echo)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Demo backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(signals::wait_for_signal())
        .await?;

    tracing::info!(port = cli.port, "Demo backend stopped");
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn page(State(state): State<BackendState>) -> impl IntoResponse {
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Backend {port}</title></head>\n<body>\n<h1>Hello from port {port}</h1>\n</body>\n</html>",
        port = state.port
    ))
}

async fn text(State(state): State<BackendState>) -> String {
    format!("Hello from backend on port {}", state.port)
}

async fn echo(
    State(state): State<BackendState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> impl IntoResponse {
    tracing::info!(%method, path = %uri.path(), body_size = body.len(), "Request");
    Json(json!({
        "message": "Hello from backend",
        "port": state.port,
        "path": uri.path(),
        "method": method.as_str(),
        "body_size": body.len(),
    }))
}
