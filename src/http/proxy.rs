//! Single execution: `POST /api/proxy`.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::descriptor::ProxyPayload;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::outcome::ExecutionResult;
use crate::routing::Destination;

/// The upstream's status travels inside the JSON body; this endpoint answers
/// 200 for any completed exchange.
pub async fn proxy_request(
    State(state): State<AppState>,
    payload: Result<Json<ProxyPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let descriptor = payload.into_descriptor(state.config.timeouts.default_ms)?;

    tracing::info!(
        method = %descriptor.method(),
        url = %descriptor.url(),
        destination = %Destination::for_url(descriptor.url()),
        "Proxying request"
    );

    let result = state.executor.execute(&descriptor).await;
    let status = match &result {
        ExecutionResult::Completed(_) => StatusCode::OK,
        ExecutionResult::Failed(error) => error.code.http_status(),
    };
    Ok((status, Json(result)).into_response())
}

pub async fn proxy_health() -> Json<Value> {
    Json(json!({
        "service": "Proxy Service",
        "status": "OK",
        "timestamp": unix_timestamp(),
        "features": [
            "CORS bypass",
            "Request forwarding",
            "Response formatting",
            "Error handling",
            "Bulk execution",
        ],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": unix_timestamp() }))
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
