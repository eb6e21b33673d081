use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Exponential backoff: the delay after failed attempt `n` (0-based) is
/// `base_delay * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed with a transient error.
    Exhausted { last_error: E, attempts: u32 },
    /// A permanent error stopped the loop early.
    Aborted { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            RetryOutcome::Succeeded { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the policy's
/// attempt budget is spent. The closure receives the 0-based attempt index.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt + 1,
                }
            }
            Err(error) if !error.is_retryable() => {
                warn!(attempt = attempt + 1, %error, "permanent failure, not retrying");
                return RetryOutcome::Aborted {
                    error,
                    attempts: attempt + 1,
                };
            }
            Err(error) => {
                if attempt + 1 >= max_attempts {
                    warn!(attempts = attempt + 1, %error, "retries exhausted");
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt + 1,
                    };
                }

                let delay = policy.delay_for(attempt);
                debug!(attempt = attempt + 1, ?delay, %error, "transient failure, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, derive_more::Display)]
    enum TestError {
        #[display("busy")]
        Busy,
        #[display("denied")]
        Denied,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Busy)
        }
    }

    #[test]
    fn test_delay_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_policy_needs_at_least_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let outcome = retry_with_backoff(RetryPolicy::default(), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TestError::Busy)
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.ok(), Some("done"));
        // 1s + 2s of backoff
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_stops_immediately() {
        let start = tokio::time::Instant::now();

        let outcome: RetryOutcome<(), _> =
            retry_with_backoff(RetryPolicy::default(), |_| async { Err(TestError::Denied) }).await;

        assert!(matches!(outcome, RetryOutcome::Aborted { attempts: 1, .. }));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_without_trailing_delay() {
        let start = tokio::time::Instant::now();

        let outcome: RetryOutcome<(), _> =
            retry_with_backoff(RetryPolicy::default(), |_| async { Err(TestError::Busy) }).await;

        assert!(matches!(outcome, RetryOutcome::Exhausted { attempts: 3, .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}
