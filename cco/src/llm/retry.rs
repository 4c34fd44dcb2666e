//! Bounded retry with a fixed delay between attempts

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::LlmError;

/// Default number of attempts (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between attempts
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Something that can wait. Injected so tests can run retries on a fake clock.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to try a transport-level operation, and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// A zero attempt count is treated as one
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    ///
    /// The error returned on exhaustion is the last one seen, stamped with the
    /// number of attempts made.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        debug!(max_attempts, delay_ms = self.delay.as_millis() as u64, "RetryPolicy::run: called");

        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => {
                    debug!(attempt, "RetryPolicy::run: success");
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    sleeper.sleep(self.delay).await;
                }
                Err(e) => {
                    debug!(attempt, retryable = e.is_retryable(), "RetryPolicy::run: giving up");
                    return Err(e.with_attempts(attempt));
                }
            }
        }
    }
}
