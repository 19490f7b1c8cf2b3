use std::time::Duration;

use crate::{rate_limit::RateLimiter, resolver::ResolutionOutcome};

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Retries transient provider errors with exponential backoff.
///
/// No-match outcomes and permanent errors are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: DEFAULT_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }

    /// Delay before the n-th retry (starting at 1).
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Runs `attempt` until it doesn't fail transiently or the
    /// retries are exhausted. The backoff is spent on the clock
    /// of the limiter, the attempts themselves still pass the
    /// limiter as usual.
    pub fn run<T>(
        &self,
        limiter: &RateLimiter,
        what: &str,
        mut attempt: impl FnMut() -> ResolutionOutcome<T>,
    ) -> ResolutionOutcome<T> {
        let mut retries = 0;
        loop {
            match attempt() {
                ResolutionOutcome::Failed(err)
                    if err.is_transient() && retries < self.max_retries =>
                {
                    retries += 1;
                    let delay = self.delay(retries);
                    log::info!(
                        "Retrying '{}' in {:?} ({}/{}): {}",
                        what,
                        delay,
                        retries,
                        self.max_retries,
                        err
                    );
                    limiter.pause(delay);
                }
                outcome => return outcome,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
