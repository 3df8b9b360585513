//! Retry policy for gateway requests.

use crate::error::{Result, SyncError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Exponential backoff with optional full jitter.
///
/// `max_attempts` counts the first try, so `1` disables retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Upper bound on a single delay. `None` leaves it uncapped.
    pub max_delay: Option<Duration>,
    /// Draw each delay uniformly from `[0, backoff]` instead of sleeping the full backoff.
    pub jitter: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// A single attempt with no delay.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Some(Duration::ZERO),
            jitter: false,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff after the failed attempt `attempt` (0-indexed), before jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt);
        let delay = self.initial_delay.saturating_mul(multiplier);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    pub fn delay_for_attempt<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let ceiling = self.backoff(attempt);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }
        let millis = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(rng.gen_range(0..=millis))
    }

    /// Whether the failed attempt `attempt` (0-indexed) should be followed by another.
    pub fn should_retry(&self, error: &SyncError, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts && error.is_transient()
    }

    /// Runs `call` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(&e, attempt) => {
                    let delay = self.delay_for_attempt(attempt, &mut rand::thread_rng());
                    debug!(operation, attempt, ?delay, error = %e, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(300),
            max_delay: None,
            jitter: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn server_error() -> SyncError {
        SyncError::Status {
            status: 503,
            body: "unavailable".into(),
        }
    }

    #[test]
    fn test_exponential_backoff_without_jitter() {
        let policy = RetryPolicy::default().with_jitter(false);
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(policy.delay_for_attempt(0, &mut rng), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(1, &mut rng), Duration::from_millis(600));
        assert_eq!(policy.delay_for_attempt(2, &mut rng), Duration::from_millis(1200));
    }

    #[test]
    fn test_max_delay_caps_backoff() {
        let policy = RetryPolicy::default()
            .with_jitter(false)
            .with_max_delay(Duration::from_millis(500));
        assert_eq!(policy.backoff(5), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_stays_within_backoff() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(42);
        for attempt in 0..4 {
            let delay = policy.delay_for_attempt(attempt, &mut rng);
            assert!(delay <= policy.backoff(attempt));
        }
    }

    #[test]
    fn test_should_retry_respects_attempts_and_kind() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(&server_error(), 0));
        assert!(policy.should_retry(&server_error(), 1));
        assert!(!policy.should_retry(&server_error(), 2));
        assert!(!policy.should_retry(&SyncError::Unauthenticated("expired".into()), 0));
        assert!(!RetryPolicy::none().should_retry(&server_error(), 0));
    }

    #[tokio::test]
    async fn test_run_retries_transient_failures() {
        let policy = RetryPolicy::default().with_initial_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let value = policy
            .run("checkout", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_gives_up_on_permanent_failure() {
        let policy = RetryPolicy::default().with_initial_delay(Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: Result<()> = policy
            .run("checkout", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SyncError::Protocol("Variant not found".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
