//! Simulated work subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → duration.rs (DurationSource picks how long the work takes)
//!     → task.rs (race the work against the request scope)
//!     → TaskOutcome (Success / DeadlineExceeded / OtherFailure)
//! ```
//!
//! # Design Decisions
//! - The duration source is injected so tests can force either branch
//! - The work is a timer; stopping the scope only stops the waiting

pub mod duration;
pub mod task;

pub use duration::{DurationSource, FixedDuration, RandomDuration};
pub use task::{simulate, TaskError, TaskOutcome};
