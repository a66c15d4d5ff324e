//! Stored-request execution: single and bulk.

use std::collections::HashSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::bulk::{BulkExecutionReport, BulkItem};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::outcome::{ExecutionError, ExecutionResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkExecuteRequest {
    #[serde(default)]
    pub request_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkExecuteResponse {
    pub collection_id: i64,
    #[serde(flatten)]
    pub report: BulkExecutionReport,
}

#[derive(Debug, Serialize)]
pub struct RequestSummary {
    pub id: i64,
    pub name: String,
    pub method: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct StoredExecution {
    #[serde(flatten)]
    pub result: ExecutionResult,
    pub request: RequestSummary,
}

/// `POST /api/collections/{id}/requests/bulk-execute`
///
/// Always 200 once the batch runs; item failures are data.
pub async fn bulk_execute(
    State(state): State<AppState>,
    Path(collection_id): Path<i64>,
    payload: Result<Json<BulkExecuteRequest>, JsonRejection>,
) -> Result<Json<BulkExecuteResponse>, ApiError> {
    let Json(request) = payload?;

    if request.request_ids.is_empty() {
        return Err(ApiError::validation("Request IDs array is required"));
    }
    let max = state.config.bulk.max_requests;
    if request.request_ids.len() > max {
        return Err(ApiError::validation(format!(
            "At most {max} requests can be executed in one batch"
        )));
    }

    if !state.store.collection_exists(collection_id).await? {
        return Err(ApiError::NotFound("Collection"));
    }

    let ids = unique_in_order(&request.request_ids);
    let stored = state.store.get_requests(collection_id, &ids).await?;
    if stored.is_empty() {
        return Err(ApiError::NotFound("Requests"));
    }

    let default_timeout_ms = state.config.timeouts.default_ms;
    let items = stored
        .iter()
        .map(|s| BulkItem::from_stored(s, default_timeout_ms))
        .collect();
    let report = state.coordinator.execute_all(items).await;

    Ok(Json(BulkExecuteResponse {
        collection_id,
        report,
    }))
}

/// `POST /api/collections/{id}/requests/{request_id}/execute`
pub async fn execute_stored(
    State(state): State<AppState>,
    Path((collection_id, request_id)): Path<(i64, i64)>,
) -> Result<Json<StoredExecution>, ApiError> {
    if !state.store.collection_exists(collection_id).await? {
        return Err(ApiError::NotFound("Collection"));
    }
    let stored = state
        .store
        .get_request(collection_id, request_id)
        .await?
        .ok_or(ApiError::NotFound("Collection request"))?;

    let result = match stored.to_descriptor(state.config.timeouts.default_ms) {
        Ok(descriptor) => state.executor.execute(&descriptor).await,
        Err(e) => ExecutionError::validation(&e).into(),
    };

    Ok(Json(StoredExecution {
        result,
        request: RequestSummary {
            id: stored.id,
            name: stored.name,
            method: stored.method,
            url: stored.url,
        },
    }))
}

/// First occurrence keeps its position.
fn unique_in_order(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
