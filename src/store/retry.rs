//! Exponential backoff for transient rate-limit failures.

use std::future::Future;
use std::time::Duration;

use log::warn;
use rand::Rng;

use super::sheet::EngineResult;

/// Default number of attempts (initial call plus retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff is capped regardless of attempt count.
const MAX_BACKOFF_MS: u64 = 32_000;
/// Random jitter added to each backoff, exclusive upper bound.
const JITTER_MS: u64 = 1_000;

/// Invoke `op`, retrying only on rate-limit errors.
///
/// The delay before attempt `n+1` is
/// `min(32000ms, 2^n * 1000ms + jitter)` with jitter in `[0, 1000ms)`.
/// Any non-rate-limit error is returned immediately without delay;
/// exhausting attempts returns the last rate-limit error.
pub async fn with_retry<T, F, Fut>(mut op: F, max_attempts: u32) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt + 1 < max_attempts => {
                // the 32s ceiling is reached at attempt 5; capping the
                // exponent keeps the shift in range for any attempt count
                let backoff_ms = 1000u64 << attempt.min(5);
                let jitter_ms = rand::thread_rng().gen_range(0..JITTER_MS);
                let delay = Duration::from_millis((backoff_ms + jitter_ms).min(MAX_BACKOFF_MS));
                warn!(
                    "Rate limited, retrying in {}ms (attempt {}/{})",
                    delay.as_millis(),
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sheet::EngineError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn retries_rate_limits_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = with_retry(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(EngineError::RateLimited("quota".to_string()))
                    } else {
                        Ok(42)
                    }
                }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_rate_limit_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: EngineResult<()> = with_retry(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(EngineError::NotFound("row 7".to_string()))
                }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert!(matches!(result, Err(EngineError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_attempts_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: EngineResult<()> = with_retry(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(EngineError::RateLimited("quota".to_string()))
                }
            },
            DEFAULT_MAX_ATTEMPTS,
        )
        .await;

        assert!(matches!(result, Err(EngineError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_stays_capped_at_high_attempt_counts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: EngineResult<()> = with_retry(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(EngineError::RateLimited("quota".to_string()))
                }
            },
            70,
        )
        .await;

        assert!(matches!(result, Err(EngineError::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 70);
    }
}
