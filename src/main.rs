//! Request deadline service.
//!
//! Every request runs a unit of simulated work under a request-scoped
//! deadline. Work that finishes in time answers 200; work preempted by the
//! deadline answers 504.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id ─▶ trace span ─▶ deadline middleware ─▶ work handler
//!                                                 (scope = now + 5s)      │
//!                                                                          ▼
//!                                                            select! { work done,
//!                                                                      scope stopped }
//!     Client Response                                                      │
//!     ◀───────────── 200 / 504 / 500, empty body ◀─────────────────────────┘
//! ```

use request_deadline::config::ServiceConfig;
use request_deadline::lifecycle::startup;
use request_deadline::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::default();
    logging::init(&config.observability.log_level);

    tracing::info!("request-deadline v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
