//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → executor.rs (prepare: default headers, body policy)
//!     → reqwest::Client (shared pool) under a per-call deadline
//!     → RawResponse | TransportError (error.rs classifies failures)
//!     → outcome::normalize → ExecutionResult
//! ```
//!
//! State per execution: `Idle → InFlight → {Completed | Failed}`.

pub mod error;
pub mod executor;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub use error::TransportError;
pub use executor::{Executor, ExecutorBuildError, DEFAULT_ACCEPT};

/// A fully read upstream response, before normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}
