//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, probabilities in [0, 1])
//! - Validate addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("work.long_ms ({long_ms}) must not be shorter than work.short_ms ({short_ms})")]
    LongShorterThanShort { short_ms: u64, long_ms: u64 },

    #[error("work.long_probability must be within [0, 1], got {0}")]
    Probability(f64),
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::Zero("timeouts.request_ms"));
    }

    let work = &config.work;
    if work.short_ms == 0 {
        errors.push(ValidationError::Zero("work.short_ms"));
    }
    if work.long_ms < work.short_ms {
        errors.push(ValidationError::LongShorterThanShort {
            short_ms: work.short_ms,
            long_ms: work.long_ms,
        });
    }
    if !(0.0..=1.0).contains(&work.long_probability) {
        errors.push(ValidationError::Probability(work.long_probability));
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
