//! Concurrent fan-out / fan-in over the forwarding executor.

use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time;
use uuid::Uuid;

use crate::config::BulkConfig;
use crate::descriptor::{DescriptorError, RequestDescriptor};
use crate::forward::Executor;
use crate::observability::metrics;
use crate::outcome::{ErrorCode, ExecutionError, ExecutionResult};
use crate::store::StoredRequest;

use super::report::{BulkExecutionReport, BulkItemResult};

/// One entry of a batch. The descriptor may already have failed validation.
#[derive(Debug, Clone)]
pub struct BulkItem {
    pub request_id: i64,
    pub request_name: String,
    pub request_method: String,
    pub request_url: String,
    pub descriptor: Result<RequestDescriptor, DescriptorError>,
}

impl BulkItem {
    pub fn new(request_id: i64, request_name: impl Into<String>, descriptor: RequestDescriptor) -> Self {
        Self {
            request_id,
            request_name: request_name.into(),
            request_method: descriptor.method().to_string(),
            request_url: descriptor.url().to_string(),
            descriptor: Ok(descriptor),
        }
    }

    /// Keeps the stored method/url verbatim so invalid entries still correlate.
    pub fn from_stored(stored: &StoredRequest, default_timeout_ms: u64) -> Self {
        Self {
            request_id: stored.id,
            request_name: stored.name.clone(),
            request_method: stored.method.clone(),
            request_url: stored.url.clone(),
            descriptor: stored.to_descriptor(default_timeout_ms),
        }
    }
}

enum Pending {
    Running(JoinHandle<ExecutionResult>),
    Ready(ExecutionResult),
}

#[derive(Debug, Clone)]
pub struct BulkCoordinator {
    executor: Executor,
    batch_deadline: Option<Duration>,
}

impl BulkCoordinator {
    pub fn new(executor: Executor, batch_deadline: Option<Duration>) -> Self {
        Self {
            executor,
            batch_deadline,
        }
    }

    pub fn from_config(executor: Executor, config: &BulkConfig) -> Self {
        Self::new(executor, config.batch_deadline_ms.map(Duration::from_millis))
    }

    /// Execute every item concurrently and report in input order.
    pub async fn execute_all(&self, items: Vec<BulkItem>) -> BulkExecutionReport {
        let batch_id = Uuid::new_v4();
        let started = Instant::now();
        let deadline = self.batch_deadline.map(|d| time::Instant::now() + d);

        tracing::info!(batch_id = %batch_id, items = items.len(), "Bulk execution started");

        let mut tagged = Vec::with_capacity(items.len());
        let mut pending = Vec::with_capacity(items.len());
        for item in items {
            let task = match item.descriptor {
                Ok(descriptor) => {
                    let executor = self.executor.clone();
                    Pending::Running(tokio::spawn(run_item(executor, descriptor, deadline)))
                }
                Err(ref e) => {
                    tracing::warn!(batch_id = %batch_id, request_id = item.request_id, error = %e, "Invalid stored request");
                    Pending::Ready(ExecutionError::validation(e).into())
                }
            };
            pending.push(task);
            tagged.push((item.request_id, item.request_name, item.request_method, item.request_url));
        }

        let finished = join_all(pending.into_iter().map(|task| async move {
            match task {
                Pending::Ready(result) => result,
                Pending::Running(handle) => handle.await.unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Bulk item task aborted");
                    ExecutionError::new(ErrorCode::Unknown, format!("Request task failed: {e}")).into()
                }),
            }
        }))
        .await;

        let results = tagged
            .into_iter()
            .zip(finished)
            .map(|((request_id, request_name, request_method, request_url), result)| BulkItemResult {
                request_id,
                request_name,
                request_method,
                request_url,
                success: result.is_completed(),
                result,
            })
            .collect();

        let report = BulkExecutionReport::from_results(results);
        tracing::info!(
            batch_id = %batch_id,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Bulk execution finished"
        );
        metrics::record_bulk(report.succeeded, report.failed);
        report
    }
}

async fn run_item(
    executor: Executor,
    descriptor: RequestDescriptor,
    deadline: Option<time::Instant>,
) -> ExecutionResult {
    let Some(deadline) = deadline else {
        return executor.execute(&descriptor).await;
    };
    match time::timeout_at(deadline, executor.execute(&descriptor)).await {
        Ok(result) => result,
        Err(_) => ExecutionError::new(
            ErrorCode::Timeout,
            "The batch deadline passed before the request completed",
        )
        .into(),
    }
}
