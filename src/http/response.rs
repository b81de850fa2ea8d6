//! Response mapping.
//!
//! # Responsibilities
//! - Map a task outcome to exactly one HTTP status code
//!
//! # Design Decisions
//! - No response body in any branch
//! - Deadline expiry results in 504 Gateway Timeout
//! - Anything else that is not success results in 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::work::TaskOutcome;

impl TaskOutcome {
    pub fn status_code(self) -> StatusCode {
        match self {
            TaskOutcome::Success => StatusCode::OK,
            TaskOutcome::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            TaskOutcome::OtherFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TaskOutcome {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}
