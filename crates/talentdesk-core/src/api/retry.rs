//! Bounded retry with linear backoff for the few calls that opt into it.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::ApiError;

/// Retries allowed for the dashboard statistics fetch (3 attempts total).
const DASHBOARD_STATS_MAX_RETRIES: u32 = 2;

/// Backoff unit for the dashboard statistics fetch: 2s, then 4s.
const DASHBOARD_STATS_BASE_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Policy for `GET /dashboard/stats`.
    pub const fn dashboard_stats() -> Self {
        Self::new(
            DASHBOARD_STATS_MAX_RETRIES,
            Duration::from_millis(DASHBOARD_STATS_BASE_DELAY_MS),
        )
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `op`, retrying transient failures (rate limit, network, timeout) up
/// to `policy.max_retries` times. Any other error is returned immediately.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut retries = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.delay_for(retries);
                warn!(
                    error = %err,
                    retry = retries,
                    backoff_ms = delay.as_millis() as u64,
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
