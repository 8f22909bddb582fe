// Bounded linear retry for one sampling cycle.

use std::time::Duration;

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_STEP: Duration = Duration::from_millis(100);

/// `max_attempts` counts the first try; the wait before attempt `n + 1` is
/// `n * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            step: RETRY_STEP,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            step,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-based), or None once the
    /// cycle is exhausted.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(self.step * attempt)
    }

    /// Sum of every delay a fully failing cycle waits.
    pub fn worst_case_delay(&self) -> Duration {
        (1..self.max_attempts).map(|n| self.step * n).sum()
    }
}
