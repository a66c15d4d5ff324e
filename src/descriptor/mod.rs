//! Request descriptors.
//!
//! # Data Flow
//! ```text
//! JSON payload / stored request / CLI args
//!     → payload.rs (wire shape, serde)
//!     → DescriptorBuilder::build (validate URL, method, headers, timeout)
//!     → RequestDescriptor (validated, immutable)
//!     → forward::Executor
//! ```
//!
//! # Design Decisions
//! - Validation happens once, at construction; execution never re-checks
//! - Header names collide case-insensitively, last write wins
//! - Timeouts above `MAX_TIMEOUT_MS` are clamped rather than rejected

pub mod method;
pub mod payload;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use method::HttpMethod;
pub use payload::ProxyPayload;

/// Timeout applied when the caller does not specify one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Hard ceiling for a single execution.
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Errors raised while building a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("unknown HTTP method '{0}'")]
    UnknownMethod(String),

    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),

    #[error("timeout must be a positive number of milliseconds")]
    ZeroTimeout,
}

/// Outgoing request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured value, serialized to JSON on the wire.
    Json(Value),
    /// Already-serialized payload, sent verbatim.
    Text(String),
}

impl RequestBody {
    /// Strings stay raw text; everything else is treated as structured JSON.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text)),
            other => Some(Self::Json(other)),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    /// Bytes sent upstream.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Text(text) => text.clone().into_bytes(),
        }
    }

    /// Representation used when re-encoding the request as JSON (relay payloads).
    pub fn to_value(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

/// A validated, immutable description of one HTTP call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: HttpMethod,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
    timeout: Duration,
}

impl RequestDescriptor {
    /// Start building a descriptor. Nothing is validated until [`DescriptorBuilder::build`].
    pub fn builder(method: impl Into<String>, url: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout_ms: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Collects raw descriptor parts prior to validation.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    timeout_ms: Option<u64>,
}

impl DescriptorBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn maybe_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn maybe_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Validate every part and produce the descriptor.
    pub fn build(self) -> Result<RequestDescriptor, DescriptorError> {
        let method: HttpMethod = self.method.parse()?;
        let url = parse_target(&self.url)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|_| DescriptorError::InvalidHeaderName(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| DescriptorError::InvalidHeaderValue(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let timeout_ms = match self.timeout_ms {
            Some(0) => return Err(DescriptorError::ZeroTimeout),
            Some(ms) if ms > MAX_TIMEOUT_MS => {
                tracing::debug!(requested_ms = ms, max_ms = MAX_TIMEOUT_MS, "Clamping timeout");
                MAX_TIMEOUT_MS
            }
            Some(ms) => ms,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body: self.body,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn parse_target(raw: &str) -> Result<Url, DescriptorError> {
    let url = Url::parse(raw.trim()).map_err(|e| DescriptorError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(DescriptorError::UnsupportedScheme(other.to_string())),
    }

    if url.host().is_none() {
        return Err(DescriptorError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
