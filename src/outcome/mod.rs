//! Result normalization.
//!
//! # Data Flow
//! ```text
//! forward::Executor
//!     → Ok(RawResponse)       → CompletedExchange {status, statusText, headers, data}
//!     → Err(TransportError)   → ExecutionError {error, message, code}
//!     → ExecutionResult (serialized untagged, so exactly one shape appears)
//! ```
//!
//! # Design Decisions
//! - Upstream 4xx/5xx are completed exchanges, never errors
//! - `status` and `code` never appear on the same result
//! - Body decoding is decided once per response by decode.rs

pub mod decode;

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::DescriptorError;
use crate::forward::{RawResponse, TransportError};

pub use decode::DecodeStrategy;

/// Stable error taxonomy shared by the relay and its callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConnectionRefused,
    Timeout,
    HostNotFound,
    ValidationFailed,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConnectionRefused => "CONNECTION_REFUSED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::HostNotFound => "HOST_NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// Status the single-execution endpoint answers with for this failure.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::ConnectionRefused | ErrorCode::HostNotFound => StatusCode::BAD_GATEWAY,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An upstream exchange that produced a status line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedExchange {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub data: Value,
}

/// A call that could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionError {
    /// Short title, e.g. "Connection refused".
    pub error: String,
    pub message: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ExecutionError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let error = match code {
            ErrorCode::ConnectionRefused => "Connection refused",
            ErrorCode::Timeout => "Request timeout",
            ErrorCode::HostNotFound => "Host not found",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::Unknown => "Proxy error",
        };
        Self {
            error: error.to_string(),
            message: message.into(),
            code,
            details: Vec::new(),
        }
    }

    pub fn from_transport(err: &TransportError) -> Self {
        Self::new(err.code(), err.to_string())
    }

    pub fn validation(err: &DescriptorError) -> Self {
        let mut error = Self::new(ErrorCode::ValidationFailed, err.to_string());
        error.details.push(err.to_string());
        error
    }
}

/// Normalized outcome of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionResult {
    Completed(CompletedExchange),
    Failed(ExecutionError),
}

impl ExecutionResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionResult::Completed(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ExecutionResult::Completed(exchange) => Some(exchange.status),
            ExecutionResult::Failed(_) => None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ExecutionResult::Completed(_) => None,
            ExecutionResult::Failed(error) => Some(error.code),
        }
    }
}

impl From<ExecutionError> for ExecutionResult {
    fn from(error: ExecutionError) -> Self {
        ExecutionResult::Failed(error)
    }
}

/// Map a raw transport outcome to the documented result shape.
pub fn normalize(outcome: Result<RawResponse, TransportError>) -> ExecutionResult {
    match outcome {
        Ok(raw) => ExecutionResult::Completed(complete(raw)),
        Err(err) => ExecutionResult::Failed(ExecutionError::from_transport(&err)),
    }
}

fn complete(raw: RawResponse) -> CompletedExchange {
    let strategy = DecodeStrategy::for_content_type(
        raw.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
    );
    CompletedExchange {
        status: raw.status.as_u16(),
        status_text: raw.status.canonical_reason().unwrap_or_default().to_string(),
        headers: flatten_headers(&raw.headers),
        data: strategy.decode(&raw.body),
    }
}

/// Repeated headers are joined with ", "; non-UTF-8 values are decoded lossily.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}
