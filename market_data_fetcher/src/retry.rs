//! Bounded retry with exponential backoff.
//!
//! The delay computation is a pure function of the attempt number so the
//! schedule can be unit tested, and the sleep itself is behind the
//! [`Sleeper`] trait so tests never wait on real time.

use std::time::Duration;

use async_trait::async_trait;

/// Retry budget for one page request against a source.
///
/// The schedule is exponential with factor 2 and a cap:
/// `base, 2*base, 4*base, ...` up to `max_delay`. One discipline,
/// applied uniformly to every retryable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Abstraction over waiting, injectable for deterministic tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_then_caps() {
        let policy = RetryPolicy::default();
        let seconds: Vec<u64> = (1..=7).map(|n| policy.delay_for(n).as_secs()).collect();
        assert_eq!(seconds, vec![1, 2, 4, 8, 16, 16, 16]);
    }

    #[test]
    fn custom_base_delay_scales_schedule() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(2000));
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), policy.max_delay);
    }
}
