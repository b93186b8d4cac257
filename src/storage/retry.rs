//! Fixed-delay retry for object-store operations.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Total attempts per operation (initial try included).
pub const MAX_ATTEMPTS: u32 = 3;
/// Pause between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Run `op` up to [`MAX_ATTEMPTS`] times, sleeping [`RETRY_DELAY`] between
/// attempts. Returns the first success or the last error.
pub async fn with_retries<T, E, F, Fut>(label: &str, mut op: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut last_err = None;
    for attempt in 1..=MAX_ATTEMPTS {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < MAX_ATTEMPTS {
                    warn!(
                        label,
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        error = %e,
                        "operation failed, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                last_err = Some(e);
            }
        }
    }
    Err(last_err.expect("at least one attempt was made"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, String> = with_retries("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_two_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, String> = with_retries("test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, String> = with_retries("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("persistent".to_string()) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "persistent");
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }
}
