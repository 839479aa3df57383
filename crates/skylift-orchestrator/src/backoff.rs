//! Exponential backoff with jitter

use std::time::Duration;

use rand::Rng;

/// Delay policy between polling attempts.
///
/// The pre-jitter sequence under the defaults is 500, 750, 1125, 1688,
/// 2531, 3797, 5000, 5000, ... ms. Jitter only ever adds: concurrent
/// pollers against the same endpoint drift apart instead of synchronizing.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Growth factor applied to each subsequent delay.
    pub multiplier: f64,

    /// Ceiling the pre-jitter delay never exceeds.
    pub max_delay: Duration,

    /// Fraction of the base delay added as uniform random jitter,
    /// e.g. 0.2 for up to +20%.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_secs(5),
            jitter: 0.2,
        }
    }
}

impl BackoffConfig {
    /// A fixed delay with no growth and no jitter. Mostly useful in tests.
    pub fn constant(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            jitter: 0.0,
        }
    }

    /// The base delay following `current`, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_delay)
    }

    /// `base` plus a uniform random share of itself in `[0, jitter)`.
    pub fn jittered(&self, base: Duration) -> Duration {
        if self.jitter <= 0.0 || base.is_zero() {
            return base;
        }
        let fraction = rand::thread_rng().gen_range(0.0..self.jitter);
        base + base.mul_f64(fraction)
    }
}
