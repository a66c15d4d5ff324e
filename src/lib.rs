//! HTTP request execution and forwarding engine.
//!
//! Takes declaratively described HTTP requests, executes them against
//! arbitrary upstreams on the caller's behalf and folds every outcome into
//! one uniform [`ExecutionResult`]. Batches run concurrently with per-item
//! fault isolation through [`BulkCoordinator`].

// Request model
pub mod descriptor;
pub mod routing;

// Execution
pub mod bulk;
pub mod forward;
pub mod outcome;

// Collaborators and callers
pub mod client;
pub mod store;

// Service surface and cross-cutting concerns
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use bulk::{BulkCoordinator, BulkExecutionReport, BulkItem, BulkItemResult};
pub use config::RelayConfig;
pub use descriptor::{HttpMethod, ProxyPayload, RequestBody, RequestDescriptor};
pub use forward::Executor;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use outcome::{CompletedExchange, ErrorCode, ExecutionError, ExecutionResult};
pub use routing::Destination;
