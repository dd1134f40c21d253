//! Uniform fail-fast retry policy for every outbound provider call.
//!
//! One place owns the contract: at most one quick retry, then give up and
//! let the caller fall through to its next tier. Slow or quota-exhausted
//! providers must never stall a discovery run.

use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// No retries at all. Used by tests that count calls.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Run `op`, retrying errors for which `retryable` returns true, up to
    /// the configured attempt limit.
    pub async fn run<T, E, F, Fut, P>(&self, retryable: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && retryable(&err) => {
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
