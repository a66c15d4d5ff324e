//! Caller-side execution.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → dispatch.rs: classify the target from the caller's point of view
//!     → Local  → forward::Executor (in-process, direct)
//!     → Remote → relay.rs: POST {url, method, headers, body, timeout} to /api/proxy
//!     → ExecutionResult (same shape either way)
//! ```
//!
//! # Design Decisions
//! - The caller owns the local/remote decision; the relay never second-guesses it
//! - A relay reply that is not an ExecutionResult becomes UNKNOWN
//! - Failing to reach the relay is classified with the transport taxonomy

pub mod dispatch;
pub mod relay;

pub use dispatch::{Dispatched, Dispatcher, Route};
pub use relay::{RelayClient, RelayClientError};
