//! Retry policy for outbound HTTP requests
//!
//! Only transport failures are retried. A response with an error status is a
//! valid answer from the server and is handed back to the caller untouched.

use std::time::Duration;

use crate::config::HttpConfig;

/// Whether repeating a request can have side effects on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Safe to repeat (GETs, pure reads)
    Idempotent,
    /// Repeating may duplicate a side effect (logins, message posts)
    NonIdempotent,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Calculate exponential backoff delay for retry attempt (1-based)
    ///
    /// With the default base of 500ms: 500ms, 1s, 2s
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Decide whether a failed attempt may be repeated
    ///
    /// A connect error means the request never reached the server, so any
    /// request may be retried. A timeout is ambiguous: the server may have
    /// acted on it, so only idempotent requests are repeated.
    pub fn should_retry(&self, err: &reqwest::Error, idempotency: Idempotency, attempts: u32) -> bool {
        if attempts >= self.max_retries {
            return false;
        }
        if err.is_connect() {
            return true;
        }
        idempotency == Idempotency::Idempotent && err.is_timeout()
    }
}
