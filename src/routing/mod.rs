//! Routing subsystem: where should a request be executed from?
//!
//! # Data Flow
//! ```text
//! Target URL
//!     → destination.rs (host comparison against loopback names)
//!     → Destination::Local  → caller executes directly
//!     → Destination::Remote → caller asks the relay to forward it
//! ```
//!
//! # Design Decisions
//! - Pure predicate: no DNS, no sockets, same input always yields same answer
//! - Unparseable URLs classify as Remote (the relayed path)
//! - The decision belongs to the caller; the relay never refuses a Local target

pub mod destination;

pub use destination::{classify, is_local, Destination, LOOPBACK_HOSTS};
