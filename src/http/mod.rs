//! HTTP surface of the relay.
//!
//! # Data Flow
//! ```text
//! POST /api/proxy ─────────────────────→ proxy.rs → Executor → ExecutionResult
//! POST /api/collections/{id}/requests/
//!     bulk-execute ──→ collections.rs → RequestStore → BulkCoordinator → report
//!     {request_id}/execute ──→ collections.rs → RequestStore → Executor
//! GET  /health, /api/proxy/health ─────→ proxy.rs
//! ```
//!
//! Upstream failures are data in the response body. Only malformed input
//! (400), missing collections (404) and store failures (500) take the
//! error path in `error.rs`.

pub mod collections;
pub mod error;
pub mod proxy;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
