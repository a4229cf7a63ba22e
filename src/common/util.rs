use futures_timer::Delay;
use std::{future::Future, time::Duration};

// ===============================================================================================
// Retry
// ===============================================================================================
/// Runs `f` up to `retries + 1` times, waiting `delay * attempt` between attempts. Only errors
/// for which `is_retryable` returns true are retried.
#[doc(hidden)]
pub(crate) async fn with_retry<T, U, F, Fut, R>(
    retries: usize,
    delay: Duration,
    is_retryable: R,
    f: F,
) -> Result<T, U>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, U>>,
    R: Fn(&U) -> bool,
{
    let mut result = (f)().await;
    for i in 1..=retries {
        match &result {
            Err(err) if is_retryable(err) => {
                tracing::debug!("Retrying request (attempt {} of {})", i + 1, retries + 1);
                if !delay.is_zero() {
                    Delay::new(delay * i as u32).await;
                }
            }
            _ => return result,
        }
        result = (f)().await;
    }
    result
}

// ===============================================================================================
// Environment
// ===============================================================================================
#[doc(hidden)]
pub(crate) fn read_env(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) => value,
        Err(_) => default.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::with_retry;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[tokio::test]
    async fn retries_only_retryable_errors() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<(), &str> = with_retry(3, Duration::ZERO, |_| true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("down")
        })
        .await;

        assert_eq!(result, Err("down"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<(), &str> = with_retry(3, Duration::ZERO, |_| false, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("fatal")
        })
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<usize, &str> = with_retry(5, Duration::ZERO, |_| true, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err("flaky")
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
