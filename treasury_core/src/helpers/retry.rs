use std::future::Future;
use std::time::Duration;

use log::{info, warn};

use crate::error::{TreasuryError, TreasuryResult};

/// Attempt schedule for providers that enforce per-IP rate limits.
/// `delays[i]` is slept before attempt `i`; each attempt is bounded by
/// `attempt_timeout`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub delays: Vec<Duration>,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>, attempt_timeout: Duration) -> Self {
        Self {
            delays,
            attempt_timeout,
        }
    }

    pub fn single(attempt_timeout: Duration) -> Self {
        Self::new(vec![Duration::ZERO], attempt_timeout)
    }

    pub fn attempts(&self) -> usize {
        self.delays.len()
    }

    /// Longest time the whole loop can take: every delay plus every attempt
    /// running into its timeout.
    pub fn worst_case(&self) -> Duration {
        let sleeping: Duration = self.delays.iter().sum();
        sleeping + self.attempt_timeout * self.delays.len() as u32
    }

    /// Drops trailing attempts until the worst case fits in `budget`.
    /// The first attempt is always kept.
    pub fn within_budget(&self, budget: Duration) -> Self {
        let mut trimmed = self.clone();
        while trimmed.delays.len() > 1 && trimmed.worst_case() > budget {
            trimmed.delays.pop();
        }
        trimmed
    }
}

/// Runs `op` following `policy`. Retryable failures (429, timeouts, transport
/// errors) move on to the next attempt; any other error is returned at once.
pub async fn retry_rate_limited<T, F, Fut>(label: &str, policy: &RetryPolicy, mut op: F) -> TreasuryResult<T>
where
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = TreasuryResult<T>>,
{
    let mut last_error = None;

    for (attempt, delay) in policy.delays.iter().enumerate() {
        if !delay.is_zero() {
            info!("[{}] retry {}, sleeping {}ms", label, attempt, delay.as_millis());
            tokio::time::sleep(*delay).await;
        }

        match op(policy.attempt_timeout).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                warn!("[{}] attempt {} failed: {}", label, attempt + 1, e);
                last_error = Some(e);
            }
            Err(e) => {
                warn!("[{}] attempt {} aborted: {}", label, attempt + 1, e);
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| TreasuryError::InvalidInput(format!("[{}] empty retry schedule", label))))
}
