//! Bounded retry with exponential backoff and jitter.
//!
//! Retry is centralized here: the HTTP channel itself performs no retries.
//! Only errors on the transient whitelist ([`GateError::is_transient`]) are
//! retried; everything else propagates on the first attempt. When the
//! attempt budget runs out the last transient error is wrapped in
//! [`GateError::RetryExhausted`].

use crate::error::{GateError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// Exponential base (2.0 doubles the delay each attempt).
    pub exponential_base: f64,
    /// Whether to add random jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            exponential_base: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate the delay before retry number `attempt` (0-indexed).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let multiplier = self.exponential_base.powi(attempt as i32);
        let delay_secs = self.base_delay.as_secs_f64() * multiplier;
        let capped_secs = delay_secs.min(self.max_delay.as_secs_f64());

        let final_secs = if self.jitter {
            // Decorrelated jitter: scale by 0.5–1.5 so concurrent clients
            // desynchronize without ever producing a near-zero delay.
            let mut rng = rand::rng();
            let jitter_factor = rng.random_range(0.5..1.5);
            (capped_secs * jitter_factor).min(self.max_delay.as_secs_f64())
        } else {
            capped_secs
        };

        Duration::from_secs_f64(final_secs)
    }
}

/// Run `operation` with bounded retry over the transient whitelist.
///
/// Non-transient errors return immediately without a delay. Transient
/// errors are retried up to `config.max_attempts` total attempts; the
/// backoff sleep suspends only the calling task and holds no lock.
pub async fn retry_transient<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 0..config.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Request succeeded after {} attempts", attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                debug!("Error is not transient, propagating: {}", e);
                return Err(e);
            }
            Err(e) => {
                if attempt + 1 >= config.max_attempts {
                    warn!(
                        "All {} attempts exhausted. Last error: {}",
                        config.max_attempts, e
                    );
                    return Err(GateError::RetryExhausted {
                        attempts: config.max_attempts,
                        source: Box::new(e),
                    });
                }

                let delay = config.calculate_delay(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt + 1,
                    config.max_attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("retry loop returns within the attempt budget")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn rate_limited() -> GateError {
        GateError::RateLimited {
            retry_after_secs: None,
        }
    }

    #[test]
    fn test_delay_calculation_no_jitter() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(1))
            .with_jitter(false);

        assert_eq!(config.calculate_delay(0), Duration::from_secs(1));
        assert_eq!(config.calculate_delay(1), Duration::from_secs(2));
        assert_eq!(config.calculate_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(30))
            .with_jitter(false);

        // 10 * 2^3 = 80s, capped at 30s.
        assert_eq!(config.calculate_delay(3), Duration::from_secs(30));
    }

    #[test]
    fn test_delay_with_jitter_stays_in_band() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(2))
            .with_jitter(true);

        // Attempt 0 with base 2s: jitter keeps the delay in [1s, 3s].
        for _ in 0..20 {
            let delay = config.calculate_delay(0);
            assert!(
                delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3),
                "Delay {:?} should be between 1s and 3s",
                delay
            );
        }
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let config = RetryConfig::new().with_max_attempts(3);
        let result = retry_transient(&config, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let config = RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(20))
            .with_jitter(false);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let t0 = Instant::now();
        let result = retry_transient(&config, || {
            let counter = counter_clone.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // Two backoff delays: 20ms + 40ms.
        assert!(t0.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_last_error() {
        let config = RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false);

        let result: Result<()> = retry_transient(&config, || async {
            Err(GateError::Server {
                status: 500,
                body: "boom".into(),
            })
        })
        .await;

        match result.unwrap_err() {
            GateError::RetryExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, GateError::Server { status: 500, .. }));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_transient_propagates_without_delay() {
        let config = RetryConfig::new()
            .with_max_attempts(5)
            .with_base_delay(Duration::from_secs(10))
            .with_jitter(false);

        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let t0 = Instant::now();
        let result: Result<()> = retry_transient(&config, || {
            let attempts = attempts_clone.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(GateError::ProtocolViolation {
                    message: "no tool call".into(),
                })
            }
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            GateError::ProtocolViolation { .. }
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(t0.elapsed() < Duration::from_secs(1));
    }
}
