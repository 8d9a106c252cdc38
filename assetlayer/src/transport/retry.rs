//! Bounded retry with per-attempt timeout and exponential backoff.
//!
//! One logical call is a sequence of attempts:
//!
//! ```text
//! attempt 0 ──fail──► sleep 100ms ──► attempt 1 ──fail──► sleep 200ms ──► attempt 2 ──fail──► Err(last)
//!     │                                   │                                   │
//!     └──── any HTTP response ────────────┴───────────────────────────────────┴──► Ok(response)
//! ```
//!
//! Only network-layer failures ([`TransportError`]) are retried. A response
//! with an error status is a definitive answer and is returned immediately.
//!
//! Failed attempts and exhausted calls are always logged at `warn`. The
//! tracing flag only adds an `info` line before each attempt.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::http::HttpTransport;
use super::types::{TransportError, TransportRequest, TransportResponse};

/// Default delay before the first retry (100ms).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;

/// Default multiplier for exponential backoff.
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;

/// Backoff schedule for transient transport failures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    max_retries: u32,
    /// Delay after the first failure.
    initial_delay: Duration,
    /// Multiplier applied to the delay after each failure.
    multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(0)
    }
}

impl RetryPolicy {
    /// Creates an exponential backoff policy.
    ///
    /// Uses an initial delay of [`DEFAULT_INITIAL_DELAY_MS`] doubling
    /// ([`DEFAULT_BACKOFF_MULTIPLIER`]) after each failure.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Retries after the initial attempt (0 = single attempt)
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }

    /// Override the delay before the first retry.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Retries after the initial attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts, including the initial one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculates the delay after a failed attempt.
    ///
    /// # Arguments
    ///
    /// * `attempt` - Index of the attempt that just failed (0-based)
    ///
    /// # Returns
    ///
    /// `initial_delay * multiplier^attempt`, or `None` if no attempts remain.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let factor = self.multiplier.checked_pow(attempt).unwrap_or(u32::MAX);
        Some(
            self.initial_delay
                .checked_mul(factor)
                .unwrap_or(Duration::MAX),
        )
    }
}

/// Issues logical calls against the remote API with timeout and retry.
pub struct RetryingTransport {
    base_url: String,
    inner: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    tracing: bool,
}

impl RetryingTransport {
    /// Creates a retrying transport.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Address the request paths are appended to
    /// * `inner` - Transport performing single attempts
    /// * `policy` - Retry bound and backoff schedule
    /// * `attempt_timeout` - Upper bound for each individual attempt
    pub fn new(
        base_url: impl Into<String>,
        inner: Arc<dyn HttpTransport>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            inner,
            policy,
            attempt_timeout,
            tracing: false,
        }
    }

    /// Emit an `info` line before each attempt.
    ///
    /// Retry and exhaustion warnings are logged whether or not this is set.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing = enabled;
        self
    }

    /// Base address without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The retry policy in use.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes `request`, retrying network failures per the policy.
    ///
    /// Returns the first response obtained (whatever its status), or the last
    /// failure once every attempt has failed.
    pub async fn execute(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut attempt: u32 = 0;

        loop {
            if self.tracing {
                info!(
                    method = %request.method,
                    path = %request.path,
                    attempt,
                    "Asset request"
                );
            }

            let outcome =
                match tokio::time::timeout(self.attempt_timeout, self.inner.send(&url, request))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout(self.attempt_timeout)),
                };

            let error = match outcome {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            match self.policy.delay_for_attempt(attempt) {
                Some(delay) => {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Request attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        attempts = attempt + 1,
                        error = %error,
                        "Request failed, retries exhausted"
                    );
                    return Err(error);
                }
            }
        }
    }
}
