//! Exponential backoff shared by every outbound HTTP client.
//!
//! The schedule is `base_delay * 2^n` after the n-th failed attempt
//! (1s, 2s, 4s with the defaults). The whole call, waits included, is
//! additionally bounded by `deadline`.

use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl RetryPolicy {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Wait applied after the zero-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }

    /// Sum of every wait the policy can incur.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_attempts)
            .map(|a| self.delay_for(a))
            .fold(Duration::ZERO, |acc, d| acc.saturating_add(d))
    }
}
