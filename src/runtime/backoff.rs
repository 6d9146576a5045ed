// ABOUTME: Exponential backoff intervals for retried runtime operations.
// ABOUTME: Deterministic growth with a capped interval; the caller owns the deadline.

use std::time::Duration;

pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);

/// Produces the wait before each retry: `initial * multiplier^n`, capped at `max_interval`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    multiplier: f64,
    max_interval: Duration,
    current: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(
            DEFAULT_INITIAL_INTERVAL,
            DEFAULT_MULTIPLIER,
            DEFAULT_MAX_INTERVAL,
        )
    }
}

impl ExponentialBackoff {
    pub fn new(initial_interval: Duration, multiplier: f64, max_interval: Duration) -> Self {
        Self {
            multiplier,
            max_interval,
            current: initial_interval,
        }
    }

    /// The next interval to wait, advancing the sequence.
    pub fn next_interval(&mut self) -> Duration {
        let interval = self.current;
        self.current = self
            .current
            .mul_f64(self.multiplier)
            .min(self.max_interval);
        interval
    }
}
