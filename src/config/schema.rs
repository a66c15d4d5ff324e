//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::descriptor::{DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Execution deadlines.
    pub timeouts: TimeoutConfig,

    /// Outbound HTTP client settings.
    pub client: ClientConfig,

    /// Bulk execution limits.
    pub bulk: BulkConfig,

    /// Collection store settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Limits and CORS for the relay's own endpoints.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration, in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Applied when a request does not carry its own timeout.
    pub default_ms: u64,

    /// Upper bound for any single execution.
    pub max_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: DEFAULT_TIMEOUT_MS,
            max_ms: MAX_TIMEOUT_MS,
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// User-Agent sent unless the request sets its own.
    pub user_agent: String,

    /// Redirects followed before returning the 3xx as-is (0 disables).
    pub max_redirects: usize,

    /// Honor HTTP(S)_PROXY environment variables for outbound calls.
    pub use_system_proxy: bool,

    /// Idle pooled connections are closed after this many seconds.
    pub pool_idle_timeout_secs: u64,

    /// Relay endpoint used by callers for remote targets.
    pub relay_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Postman-Lite/1.0".to_string(),
            max_redirects: 5,
            use_system_proxy: false,
            pool_idle_timeout_secs: 90,
            relay_url: "http://localhost:3000/api/proxy".to_string(),
        }
    }
}

/// Bulk execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Maximum number of request IDs accepted per batch.
    pub max_requests: usize,

    /// Optional deadline for a whole batch. Unset means each item only
    /// answers to its own timeout.
    pub batch_deadline_ms: Option<u64>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            batch_deadline_ms: None,
        }
    }
}

/// Collection store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file with collections to preload into the in-memory store.
    pub seed_path: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes accepted by the relay endpoints.
    pub max_body_size: usize,

    /// Browser origins allowed to call the relay.
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            allowed_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}
