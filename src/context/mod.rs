//! Request-scoped cancellation.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → Scope::root() (or the scope an outer layer attached)
//!     → with_timeout() derives a child bounded by an absolute deadline
//!     → child travels in request extensions to the handler
//!     → work awaits Scope::stopped() alongside its own completion
//!     → ScopeGuard dropped when the middleware returns: scope released
//! ```
//!
//! # Design Decisions
//! - Parent→child propagation rides on `tokio_util`'s `CancellationToken`
//! - Deadlines are absolute `tokio::time::Instant`s; a child never outlives
//!   its parent's deadline
//! - The stop reason latches on first observation and never changes

pub mod scope;

pub use scope::{Scope, ScopeGuard, StopReason};
