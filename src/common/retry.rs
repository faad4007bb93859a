//! Generic retry and timeout helpers for async operations. Payment calls
//! deliberately do not go through these; a failed charge surfaces to the
//! caller instead of being retried.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::warn;
use thiserror::Error;

/// Total attempts before the last error is returned.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Delay before the second attempt; doubles after every failure.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("operation timed out after {limit_ms}ms")]
pub struct TimedOut {
    pub limit_ms: u64,
}

/// Runs `operation` up to `max_attempts` times, sleeping between attempts
/// with an exponentially growing delay. The final error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(
    max_attempts: u32,
    initial_delay_ms: u64,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay_ms = initial_delay_ms;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {}ms",
                    attempt, max_attempts, err, delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms *= 2;
                attempt += 1;
            }
        }
    }
}

/// Resolves to [`TimedOut`] when `future` takes longer than `limit_ms`.
pub async fn with_timeout<F: Future>(limit_ms: u64, future: F) -> Result<F::Output, TimedOut> {
    match tokio::time::timeout(Duration::from_millis(limit_ms), future).await {
        Ok(output) => Ok(output),
        Err(_) => Err(TimedOut { limit_ms }),
    }
}
