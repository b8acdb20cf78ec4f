//! Redelivery policy for generation jobs.

use std::time::Duration;

/// Redelivery policy applied by the queue when a worker reports failure.
///
/// A job is delivered at most `max_attempts` times in total; the delay
/// before redelivery N doubles from `base_delay`. After the last failed
/// attempt the job is abandoned and the quiz set's `error` status is the
/// durable record of the outcome.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total delivery attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first redelivery.
    pub base_delay: Duration,
    /// Multiplier applied to the delay for each further redelivery.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier: 2.0,
        }
    }

    /// Set the backoff multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Returns the redelivery delay after the given failed attempt.
    ///
    /// `attempt` is the 1-based delivery count of the attempt that just
    /// failed.
    pub fn delay_after_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay_millis =
            (self.base_delay.as_millis() as f64) * self.multiplier.powi(exponent as i32);
        Duration::from_millis(delay_millis as u64)
    }

    /// Returns the full redelivery schedule.
    ///
    /// With `max_attempts` total deliveries there are `max_attempts - 1`
    /// redeliveries, so the schedule has one entry per gap.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts)
            .map(|attempt| self.delay_after_attempt(attempt))
            .collect()
    }
}
