//! Attempt loop with exponential backoff.
//!
//! Each attempt reports an explicit [`AttemptOutcome`]; the loop itself never
//! inspects HTTP details. Retry count and delays are decided here only.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    Success(T),
    /// Worth trying again after a backoff (rate limiting, network hiccup).
    Retryable(String),
    /// Stop now, retrying will not help.
    Fatal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("Attempt {attempt} failed: {reason}")]
    Fatal { attempt: u32, reason: String },
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl BackoffPolicy {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the attempt following attempt `attempt` (1-based):
    /// base, 2×base, 4×base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

/// Run `task` until it succeeds, fails fatally, or the policy's attempts are
/// used up. Sleeps with `tokio::time::sleep` between attempts.
pub async fn run_with_backoff<T, F, Fut>(policy: BackoffPolicy, task: F) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    run_with_backoff_using(policy, task, tokio::time::sleep).await
}

/// Same as [`run_with_backoff`] with a caller-supplied sleep.
pub async fn run_with_backoff_using<T, F, Fut, S, SFut>(
    policy: BackoffPolicy,
    mut task: F,
    mut sleep: S,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt = 1;
    loop {
        match task(attempt).await {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::Fatal(reason) => {
                return Err(RetryError::Fatal { attempt, reason });
            }
            AttemptOutcome::Retryable(reason) => {
                if attempt >= policy.max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: reason,
                    });
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "[Transform] Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt,
                    policy.max_attempts,
                    reason,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
