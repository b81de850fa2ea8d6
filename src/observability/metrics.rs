//! Metrics collection and exposition.
//!
//! # Metrics
//! - `deadline_requests_total` (counter): requests by outcome, status
//! - `deadline_request_duration_seconds` (histogram): handler latency by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::work::TaskOutcome;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(outcome: TaskOutcome, start_time: Instant) {
    let status = outcome.status_code().as_u16().to_string();

    counter!(
        "deadline_requests_total",
        "outcome" => outcome.as_str(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "deadline_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(start_time.elapsed().as_secs_f64());
}
