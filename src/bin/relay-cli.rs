use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use request_relay::client::{Dispatcher, RelayClient};
use request_relay::config::{load_config, ObservabilityConfig, RelayConfig};
use request_relay::descriptor::{RequestBody, RequestDescriptor};
use request_relay::forward::Executor;
use request_relay::observability::logging;
use request_relay::outcome::{ErrorCode, ExecutionError, ExecutionResult};
use request_relay::routing::{classify, Destination};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send requests directly or through a request-relay", long_about = None)]
struct Cli {
    /// Relay configuration to borrow client and timeout settings from.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one request, directly for local targets and via the relay otherwise
    Send {
        method: String,
        url: String,

        /// Request header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body; sent as JSON when it parses as JSON
        #[arg(short = 'd', long = "data")]
        body: Option<String>,

        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Relay endpoint (defaults to client.relay_url)
        #[arg(long)]
        relay: Option<String>,

        /// Relay even local targets
        #[arg(long)]
        force_relay: bool,
    },
    /// Show whether a URL is treated as local or remote
    Classify { url: String },
    /// Execute stored requests of a collection on a relay
    Bulk {
        #[arg(long)]
        collection: i64,

        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,

        #[arg(long, default_value = "http://localhost:3000")]
        base: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    logging::init(&ObservabilityConfig {
        log_level: "warn".to_string(),
        ..config.observability.clone()
    })?;

    match cli.command {
        Commands::Send {
            method,
            url,
            headers,
            body,
            timeout_ms,
            relay,
            force_relay,
        } => {
            let descriptor = match build_descriptor(&method, &url, &headers, body, timeout_ms, &config) {
                Ok(descriptor) => descriptor,
                Err(error) => return print_json(&ExecutionResult::from(error)),
            };
            let relay = RelayClient::new(relay.as_deref().unwrap_or(&config.client.relay_url))?;
            let dispatcher = Dispatcher::new(Executor::from_config(&config)?, relay).force_relay(force_relay);
            print_json(&dispatcher.dispatch(&descriptor).await)?;
        }
        Commands::Classify { url } => {
            let destination = classify(&url);
            let route = match destination {
                Destination::Local => "direct",
                Destination::Remote => "relayed",
            };
            print_json(&json!({ "url": url, "destination": destination, "route": route }))?;
        }
        Commands::Bulk { collection, ids, base } => {
            let endpoint = format!(
                "{}/api/collections/{collection}/requests/bulk-execute",
                base.trim_end_matches('/')
            );
            let res = reqwest::Client::builder()
                .no_proxy()
                .build()?
                .post(endpoint)
                .json(&json!({ "requestIds": ids }))
                .send()
                .await?;
            let status = res.status();
            let body: Value = res.json().await?;
            if !status.is_success() {
                eprintln!("Error: relay returned status {status}");
            }
            print_json(&body)?;
        }
    }

    Ok(())
}

fn build_descriptor(
    method: &str,
    url: &str,
    headers: &[String],
    body: Option<String>,
    timeout_ms: Option<u64>,
    config: &RelayConfig,
) -> Result<RequestDescriptor, ExecutionError> {
    let mut builder = RequestDescriptor::builder(method, url)
        .timeout_ms(timeout_ms.unwrap_or(config.timeouts.default_ms));

    for raw in headers {
        let (name, value) = raw.split_once(':').ok_or_else(|| {
            ExecutionError::new(
                ErrorCode::ValidationFailed,
                format!("header '{raw}' is not of the form 'Name: value'"),
            )
        })?;
        builder = builder.header(name.trim(), value.trim());
    }

    let body = body.and_then(|raw| {
        RequestBody::from_value(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    });

    builder
        .maybe_body(body)
        .build()
        .map_err(|e| ExecutionError::validation(&e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
