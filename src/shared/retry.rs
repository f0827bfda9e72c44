//! Bounded exponential backoff for collaborator calls (Bot API, ledger file).

use crate::domain::DomainError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(800),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): base * 2^attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs `op` until it succeeds, fails permanently, or attempts run out.
///
/// `RateLimited` waits the server-provided seconds; `Unavailable` waits the
/// backoff delay. Any other error is returned immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt + 1 < policy.max_attempts => {
                let wait = match &e {
                    DomainError::RateLimited { seconds } => Duration::from_secs(*seconds),
                    _ => policy.backoff(attempt),
                };
                warn!(what, attempt, wait_ms = wait.as_millis() as u64, error = %e, "transient failure, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff(0), Duration::from_millis(800));
        assert_eq!(p.backoff(1), Duration::from_millis(1600));
        assert_eq!(p.backoff(10), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res = retry_with_backoff(&fast(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DomainError::Unavailable("busy".into()))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(res.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res: Result<(), _> = retry_with_backoff(&fast(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Gateway("400 Bad Request".into()))
        })
        .await;
        assert!(res.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let res: Result<(), _> = retry_with_backoff(&fast(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::Unavailable("down".into()))
        })
        .await;
        assert!(matches!(res, Err(DomainError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
