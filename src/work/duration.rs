//! Duration sources for simulated work.

use std::time::Duration;

use rand::Rng;

use crate::config::WorkConfig;

/// Decides how long one unit of simulated work takes.
pub trait DurationSource: Send + Sync {
    fn next_duration(&self) -> Duration;
}

/// Picks the long duration with probability `long_probability`, the short one otherwise.
#[derive(Debug, Clone)]
pub struct RandomDuration {
    short: Duration,
    long: Duration,
    long_probability: f64,
}

impl RandomDuration {
    pub fn new(short: Duration, long: Duration, long_probability: f64) -> Self {
        let long_probability = if long_probability.is_nan() {
            0.0
        } else {
            long_probability.clamp(0.0, 1.0)
        };
        Self {
            short,
            long,
            long_probability,
        }
    }

    pub fn from_config(config: &WorkConfig) -> Self {
        Self::new(
            Duration::from_millis(config.short_ms),
            Duration::from_millis(config.long_ms),
            config.long_probability,
        )
    }
}

impl Default for RandomDuration {
    fn default() -> Self {
        Self::from_config(&WorkConfig::default())
    }
}

impl DurationSource for RandomDuration {
    fn next_duration(&self) -> Duration {
        if rand::thread_rng().gen_bool(self.long_probability) {
            self.long
        } else {
            self.short
        }
    }
}

/// Always the same duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDuration(pub Duration);

impl DurationSource for FixedDuration {
    fn next_duration(&self) -> Duration {
        self.0
    }
}
