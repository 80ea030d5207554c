use super::store::StoreError;
use library::helpers::Backoff;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Bounded exponential backoff policy for store mutations
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts before the operation is given up
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for the delay between two attempts
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// Five attempts with delays of 1s, 2s, 4s and 8s in between
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> Backoff {
        Backoff::new(
            self.initial_delay,
            2,
            self.max_delay,
            self.max_attempts.saturating_sub(1),
        )
    }
}

/// Runs the given store operation, retrying transient failures with exponential backoff
///
/// The operation must be safe to re-run in full; nothing of a failed
/// attempt may be assumed to have taken effect. Once the attempt budget is
/// exhausted the last failure is returned to the caller.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut backoff = policy.backoff();

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => match backoff.next() {
                Some(delay) => {
                    warn!(?error, ?delay, "Store operation failed, backing off");
                    sleep(delay).await;
                }
                None => return Err(error),
            },
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient_error() -> StoreError {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        StoreError::Transient(mongodb::error::Error::from(io))
    }

    #[tokio::test]
    async fn pass_through_an_immediate_success() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_until_the_operation_succeeds() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::default(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(transient_error())
            } else {
                Ok("made it")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "made it");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn give_up_after_exhausting_all_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&RetryPolicy::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(transient_error())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
