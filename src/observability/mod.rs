//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of an endpoint call
//! - Metrics are cheap (atomic increments) and recorded without a recorder too
//! - Log level configurable via config, overridden by RUST_LOG

pub mod logging;
pub mod metrics;
