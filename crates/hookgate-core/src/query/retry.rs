// ── Retry policy ──
//
// Exponential backoff for transient failures. Reads and mutations each
// carry their own policy; both are plain values handed to the
// `QueryClient` at construction.

use std::future::Future;
use std::time::Duration;

use hookgate_api::Error;
use tracing::debug;

/// Backoff schedule: `delay(n) = min(base * multiplier^n, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Read default: 3 retries, 1 s doubling, capped at 30 s.
    pub const fn reads() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }

    /// Mutation default: a single retry after a fixed 1 s.
    pub const fn mutations() -> Self {
        Self::fixed(1, Duration::from_secs(1))
    }

    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
        }
    }

    pub const fn none() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exp);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::reads()
    }
}

/// Run `op` until it succeeds, fails permanently, or retries run out.
///
/// Only transient errors (network, 5xx, 429) are retried.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && e.is_transient() => {
                let delay = policy.delay(attempt);
                debug!(attempt = attempt + 1, ?delay, error = %e, "retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn read_backoff_doubles_then_caps() {
        let policy = RetryPolicy::reads();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
        assert_eq!(policy.delay(5), Duration::from_secs(30));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn mutation_delay_is_fixed() {
        let policy = RetryPolicy::mutations();
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(3), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let out = retry(&RetryPolicy::reads(), move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::server(503, "Service Unavailable"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let out: Result<u32, Error> = retry(&RetryPolicy::reads(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::setup("bad input")) }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_at_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let out: Result<u32, Error> = retry(&RetryPolicy::mutations(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::network(false)) }
        })
        .await;
        assert!(out.unwrap_err().is_transient());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
