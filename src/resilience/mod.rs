//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request into the service:
//!     → deadline.rs (derive a bounded scope, attach it to the request)
//!     → handler races its work against the scope
//!     → scope released when the wrapped call returns
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every request has a deadline
//! - The middleware never writes a response itself; timed-out work is
//!   reported by the handler as 504 Gateway Timeout
//! - No retries

pub mod deadline;

pub use deadline::{deadline_middleware, DeadlinePolicy};
