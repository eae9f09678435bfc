//! Retry policy for API requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use super::cancel::CancelToken;
use crate::error::{ApiError, ErrorClass};

/// Bounded exponential-backoff policy used by `ApiClient`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound on total attempts, including the initial request.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each later retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    /// One attempt plus three retries, waiting 1s, 2s and 4s.
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Whether a failure on zero-based `attempt` earns another try.
    pub fn should_retry(&self, err: &ApiError, attempt: u32) -> bool {
        if attempt.saturating_add(1) >= self.max_attempts {
            return false;
        }
        err.class() == ErrorClass::Retryable
    }

    /// Backoff after the zero-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `operation` until it succeeds, fails fatally, or attempts run out.
///
/// Cancellation is never retried, and backoff sleeps end early on cancel.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !policy.should_retry(&err, attempt) {
            return Err(err);
        }
        let delay = policy.delay_for(attempt);
        tracing::warn!(
            attempt = attempt + 1,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "request failed, retrying"
        );
        cancel
            .run(async {
                sleep(delay).await;
                Ok(())
            })
            .await?;
        attempt += 1;
    }
}
