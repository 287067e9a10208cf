// src/error_recovery.rs
//! Fixed-delay retry for API operations.

use crate::constants::{DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_RETRY_DELAY};
use crate::error::AppError;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// A single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_RETRY_DELAY)
    }
}

/// Retries an async operation with a fixed delay while `should_retry` accepts the error.
///
/// Errors rejected by `should_retry` are returned immediately. Once the
/// attempts are exhausted the last error is returned.
pub async fn retry_fixed_delay<F, T, Fut, P>(
    mut operation: F,
    policy: RetryPolicy,
    should_retry: P,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
    P: Fn(&AppError) -> bool,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < policy.attempts && should_retry(&e) => {
                log::warn!(
                    "Attempt {}/{} failed ({}), retrying after {:?}",
                    attempt,
                    policy.attempts,
                    e,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                if attempt > 1 {
                    log::error!("Giving up after {} attempts: {}", attempt, e);
                }
                return Err(e);
            }
        }
    }
}
