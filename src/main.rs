//! HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  LOAD BALANCER                   │
//!                        │                                                  │
//!     Client Request     │  ┌─────────┐    ┌───────────┐    ┌────────────┐  │
//!     ───────────────────┼─▶│  axum   │───▶│ forwarder │───▶│  routing   │  │
//!                        │  │ server  │    │           │    │  policy    │  │
//!                        │  └─────────┘    └─────┬─────┘    └─────┬──────┘  │
//!                        │                       │                │         │
//!                        │                       │         ┌──────▼──────┐  │
//!                        │                       │         │  backend    │  │
//!                        │                       │         │  registry   │  │
//!                        │                       │         └──────▲──────┘  │
//!                        │                       ▼                │         │
//!     Client Response    │  ┌─────────┐    ┌───────────┐    ┌─────┴──────┐  │
//!     ◀──────────────────┼──│ augment │◀───│  backend  │    │   health   │──┼──▶ Backends
//!                        │  │  body   │    │  client   │────┼────────────┼──┼──▶
//!                        │  └─────────┘    └───────────┘    │  monitor   │  │
//!                        │                                  └────────────┘  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use http_balancer::config::load_config;
use http_balancer::lifecycle::{signals, Shutdown};
use http_balancer::observability::{logging, metrics};
use http_balancer::HttpServer;

#[derive(Parser)]
#[command(name = "http-balancer")]
#[command(about = "HTTP load balancer with active health checks", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, default_value = "config/balancer.toml")]
    config: PathBuf,

    /// Override the configured log level
    #[arg(short, long, value_parser = logging::LOG_LEVELS)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    let log_file = config.observability.log_file.as_deref().map(Path::new);
    logging::init(level, log_file)?;

    tracing::info!("http-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        path = %cli.config.display(),
        backends = config.backends.len(),
        algorithm = %config.algorithm,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let exited_early = tokio::select! {
        _ = signals::shutdown_on_signal(&shutdown) => None,
        result = &mut server_task => Some(result),
    };

    let result = match exited_early {
        Some(result) => {
            shutdown.trigger();
            result
        }
        None => server_task.await,
    };
    result??;

    tracing::info!("Shutdown complete");
    Ok(())
}
