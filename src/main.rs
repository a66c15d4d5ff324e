//! request-relay server.
//!
//! ```text
//!   browser / CLI
//!        │  POST /api/proxy, /api/collections/{id}/requests/...
//!        ▼
//!   ┌──────────┐   ┌──────────┐   ┌──────────────────┐
//!   │   http   │──▶│ executor │──▶│ upstream (any    │
//!   │  server  │   │ (reqwest)│   │ host, any status)│
//!   └────┬─────┘   └────▲─────┘   └──────────────────┘
//!        │              │
//!        ▼              │
//!   ┌──────────┐   ┌────┴─────┐
//!   │  store   │──▶│   bulk   │  one task per item, results in input order
//!   └──────────┘   └──────────┘
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use request_relay::config::{load_config, RelayConfig};
use request_relay::http::HttpServer;
use request_relay::lifecycle::{wait_for_signal, Shutdown};
use request_relay::observability::{logging, metrics};
use request_relay::store::memory::InMemoryStore;

#[derive(Parser)]
#[command(name = "request-relay")]
#[command(about = "Executes described HTTP requests on behalf of browser clients", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;
    tracing::info!("request-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let store = match &config.store.seed_path {
        Some(path) => InMemoryStore::from_seed_file(Path::new(path))?,
        None => InMemoryStore::new(),
    };
    tracing::info!(
        collections = store.len(),
        default_timeout_ms = config.timeouts.default_ms,
        max_timeout_ms = config.timeouts.max_ms,
        max_bulk_requests = config.bulk.max_requests,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(store))?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await?;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("request-relay stopped");
    Ok(())
}
