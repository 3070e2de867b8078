//! Explicit retry policy for calls to external services.
//!
//! Each external call (model inference, storage write) is wrapped on its own,
//! so a transient failure in one does not replay the other.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_DELAY_SECS: u64 = 60;

/// Exponential backoff: `base_delay * 2^(retry - 1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Default::default()
        }
    }

    /// A policy that runs the operation exactly once.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before the given retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `op` until it succeeds or the policy's retries are exhausted.
///
/// Returns the last error when every attempt fails.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_if(policy, label, op, |_| true).await
}

/// Like [`with_retry`], but gives up immediately on errors `should_retry` rejects.
pub async fn with_retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let mut retries = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retries < policy.max_retries && should_retry(&e) => {
                retries += 1;
                let delay = policy.delay_for(retries);
                tracing::warn!(
                    error = %e,
                    operation = label,
                    retry = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying..."
                );
                sleep(delay).await;
            }
            Err(e) => {
                if retries > 0 {
                    tracing::warn!(
                        error = %e,
                        operation = label,
                        attempts = retries + 1,
                        "Operation failed after retries"
                    );
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(500));

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let result: Result<&str, String> = with_retry(&policy, "flaky", move || async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(format!("attempt {} failed", n))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let policy = RetryPolicy::new(2, Duration::ZERO);

        let result: Result<(), String> = with_retry(&policy, "broken", move || async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            Err(format!("attempt {}", n))
        })
        .await;

        assert_eq!(result.unwrap_err(), "attempt 2");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_none_runs_once() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;

        let result: Result<(), String> = with_retry(&RetryPolicy::none(), "once", move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err("nope".to_string())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let result: Result<(), String> = with_retry_if(
            &policy,
            "permanent",
            move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err("permanent".to_string())
            },
            |e| e != "permanent",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
