//! Retry logic with exponential backoff
//!
//! Transient ARM failures (throttling, gateway errors, timeouts) are retried
//! a few times before surfacing to the caller.

use crate::error::{AnfError, Result};
use crate::utils::network::is_retryable_error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RetryOptions {
    pub max_retries: usize,
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

pub async fn retry_with_backoff<T, F, Fut>(mut operation: F, options: RetryOptions) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut interval = options.initial_interval;
    let mut last_error = None;

    for attempt in 0..=options.max_retries {
        if attempt > 0 {
            debug!("Retrying after {:?} (attempt {})", interval, attempt);
            sleep(interval).await;
            interval = std::cmp::min(
                Duration::from_secs_f64(interval.as_secs_f64() * options.multiplier),
                options.max_interval,
            );
        }

        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if !is_retryable_error(&error) {
                    return Err(error);
                }

                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| AnfError::network("Retry failed with no error")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_options() -> RetryOptions {
        RetryOptions {
            max_retries: 2,
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(2),
            multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = retry_with_backoff(
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(AnfError::azure_api("HTTP 503: busy"))
                } else {
                    Ok(7)
                }
            },
            fast_options(),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<()> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AnfError::not_found("pool"))
            },
            fast_options(),
        )
        .await;

        assert!(matches!(result, Err(AnfError::NotFound { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<()> = retry_with_backoff(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AnfError::network("request timed out"))
            },
            fast_options(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
