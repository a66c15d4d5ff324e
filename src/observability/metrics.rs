//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_executions_total` (counter): executions by method, outcome, code
//! - `relay_execution_duration_seconds` (histogram): latency by method
//! - `relay_bulk_batches_total` (counter): bulk batches run
//! - `relay_bulk_items_total` (counter): bulk items by outcome

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::outcome::ExecutionResult;
use crate::routing::Destination;

/// Start the Prometheus scrape endpoint. Must be called inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_execution(method: &str, destination: Destination, result: &ExecutionResult, elapsed: Duration) {
    let (outcome, code) = match result.code() {
        None => ("completed", "NONE"),
        Some(code) => ("failed", code.as_str()),
    };
    metrics::counter!(
        "relay_executions_total",
        "method" => method.to_string(),
        "destination" => destination.as_str(),
        "outcome" => outcome,
        "code" => code
    )
    .increment(1);
    metrics::histogram!("relay_execution_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_bulk(succeeded: usize, failed: usize) {
    metrics::counter!("relay_bulk_batches_total").increment(1);
    metrics::counter!("relay_bulk_items_total", "outcome" => "succeeded").increment(succeeded as u64);
    metrics::counter!("relay_bulk_items_total", "outcome" => "failed").increment(failed as u64);
}
