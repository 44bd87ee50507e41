//! Retry Backoff Schedule
//!
//! Per-call state for exponential backoff: each retry consumes one attempt
//! and doubles the delay. The schedule only computes delays; sleeping is up
//! to the caller.

use std::time::Duration;

use rand::Rng;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for a backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Jitter as a fraction of the delay (0.0 = exact delays).
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter_factor: 0.0,
        }
    }
}

impl BackoffConfig {
    /// Doubling schedule with the given retry count and first delay.
    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Self::default()
        }
    }
}

/// Backoff state for one logical request.
///
/// ```rust
/// use market_proxy::domain::backoff::{BackoffConfig, BackoffSchedule};
/// use std::time::Duration;
///
/// let mut schedule = BackoffSchedule::new(BackoffConfig::new(2, Duration::from_millis(100)));
/// assert_eq!(schedule.next_delay(), Some(Duration::from_millis(100)));
/// assert_eq!(schedule.next_delay(), Some(Duration::from_millis(200)));
/// assert_eq!(schedule.next_delay(), None);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    config: BackoffConfig,
    attempts_remaining: u32,
    current_delay: Duration,
}

impl BackoffSchedule {
    /// Start a fresh schedule.
    #[must_use]
    pub const fn new(config: BackoffConfig) -> Self {
        Self {
            attempts_remaining: config.max_retries,
            current_delay: config.initial_delay,
            config,
        }
    }

    /// Consume one retry and return how long to wait before it.
    ///
    /// Returns `None` once retries are exhausted.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts_remaining == 0 {
            return None;
        }
        self.attempts_remaining -= 1;

        let delay = self.apply_jitter(self.current_delay);

        #[allow(clippy::cast_precision_loss)]
        let scaled = (self.current_delay.as_millis() as f64 * self.config.multiplier).round();
        let next_millis = if scaled.is_finite() && scaled > 0.0 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                scaled as u128
            }
        } else {
            0
        };
        let capped = next_millis.min(self.config.max_delay.as_millis());
        self.current_delay = Duration::from_millis(u64::try_from(capped).unwrap_or(u64::MAX));

        Some(delay)
    }

    /// Retries still available.
    #[must_use]
    pub const fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if self.config.jitter_factor <= 0.0 {
            return delay;
        }

        let mut rng = rand::rng();
        let factor = rng.random_range(-self.config.jitter_factor..=self.config.jitter_factor);

        #[allow(clippy::cast_precision_loss)]
        let millis = delay.as_millis() as f64;
        let jittered = (millis * (1.0 + factor)).max(0.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Duration::from_millis(jittered as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles() {
        let mut schedule = BackoffSchedule::new(BackoffConfig::default());
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(1000)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(2000)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_millis(4000)));
        assert_eq!(schedule.next_delay(), None);
        assert_eq!(schedule.attempts_remaining(), 0);
    }

    #[test]
    fn zero_retries_never_waits() {
        let mut schedule = BackoffSchedule::new(BackoffConfig::new(0, Duration::from_secs(1)));
        assert_eq!(schedule.next_delay(), None);
    }

    #[test]
    fn delay_is_capped() {
        let config = BackoffConfig {
            max_retries: 5,
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
            ..BackoffConfig::default()
        };
        let mut schedule = BackoffSchedule::new(config);
        let delays: Vec<_> = std::iter::from_fn(|| schedule.next_delay()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(10),
                Duration::from_secs(10),
                Duration::from_secs(10),
            ]
        );
    }

    #[test]
    fn jitter_stays_in_bounds() {
        let config = BackoffConfig {
            max_retries: 50,
            initial_delay: Duration::from_millis(1000),
            multiplier: 1.0,
            jitter_factor: 0.1,
            ..BackoffConfig::default()
        };
        let mut schedule = BackoffSchedule::new(config);
        while let Some(delay) = schedule.next_delay() {
            assert!(delay >= Duration::from_millis(900));
            assert!(delay <= Duration::from_millis(1100));
        }
    }
}
