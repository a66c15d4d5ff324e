//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, default within max)
//! - Validate addresses, URLs and header values before they reach a builder
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use reqwest::header::HeaderValue;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::descriptor::MAX_TIMEOUT_MS;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let timeouts = &config.timeouts;
    if timeouts.default_ms == 0 {
        errors.push(ValidationError::new("timeouts.default_ms", "must be greater than 0"));
    }
    if timeouts.max_ms == 0 || timeouts.max_ms > MAX_TIMEOUT_MS {
        errors.push(ValidationError::new(
            "timeouts.max_ms",
            format!("must be between 1 and {MAX_TIMEOUT_MS}"),
        ));
    }
    if timeouts.default_ms > timeouts.max_ms {
        errors.push(ValidationError::new(
            "timeouts.default_ms",
            "must not exceed timeouts.max_ms",
        ));
    }

    if HeaderValue::from_str(&config.client.user_agent).is_err() {
        errors.push(ValidationError::new("client.user_agent", "not a valid header value"));
    }
    match Url::parse(&config.client.relay_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::new(
            "client.relay_url",
            format!("'{}' is not an absolute http(s) URL", config.client.relay_url),
        )),
    }

    if config.bulk.max_requests == 0 {
        errors.push(ValidationError::new("bulk.max_requests", "must be greater than 0"));
    }
    if config.bulk.batch_deadline_ms == Some(0) {
        errors.push(ValidationError::new("bulk.batch_deadline_ms", "must be greater than 0 when set"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", observability.log_level, LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    for origin in &config.security.allowed_origins {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "security.allowed_origins",
                format!("'{origin}' is not a valid origin"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
