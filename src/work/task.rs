//! The simulated work unit and its outcome classification.

use std::time::Duration;

use thiserror::Error;

use crate::context::{Scope, StopReason};
use crate::work::DurationSource;

/// Why simulated work did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("operation cancelled")]
    Cancelled,
}

impl From<StopReason> for TaskError {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::DeadlineExceeded => TaskError::DeadlineExceeded,
            StopReason::Cancelled => TaskError::Cancelled,
        }
    }
}

/// Closed set of results the handler maps onto a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    Success,
    DeadlineExceeded,
    OtherFailure,
}

impl TaskOutcome {
    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskOutcome::Success => "success",
            TaskOutcome::DeadlineExceeded => "deadline_exceeded",
            TaskOutcome::OtherFailure => "other_failure",
        }
    }
}

impl<T> From<&Result<T, TaskError>> for TaskOutcome {
    fn from(result: &Result<T, TaskError>) -> Self {
        match result {
            Ok(_) => TaskOutcome::Success,
            Err(TaskError::DeadlineExceeded) => TaskOutcome::DeadlineExceeded,
            Err(_) => TaskOutcome::OtherFailure,
        }
    }
}

/// Run one unit of simulated work under `scope`.
///
/// Returns the time the work took, or the scope's stop reason if the scope
/// stopped first. A scope that is already stopped fails immediately.
pub async fn simulate(scope: &Scope, durations: &dyn DurationSource) -> Result<Duration, TaskError> {
    let duration = durations.next_duration();
    tracing::trace!(duration_ms = duration.as_millis() as u64, "Simulated work started");

    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(duration),
        reason = scope.stopped() => Err(reason.into()),
    }
}
