//! Bulk execution subsystem.
//!
//! # Data Flow
//! ```text
//! [(id, name, descriptor)]  (input order)
//!     → coordinator.rs: one task per item, all started at once
//!     → each task: Executor::execute under its own deadline
//!       (plus the optional batch deadline)
//!     → join_all: wait for every task, whatever its outcome
//!     → report.rs: zip results back onto input order, count by scanning
//! ```
//!
//! # Design Decisions
//! - Wait-for-all join, never fail-fast: one bad request taints only itself
//! - No shared counters; counts are derived from finished results
//! - Invalid descriptors fail their own item before any network call

pub mod coordinator;
pub mod report;

pub use coordinator::{BulkCoordinator, BulkItem};
pub use report::{BulkExecutionReport, BulkItemResult};
