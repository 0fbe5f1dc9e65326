//! Request configuration for a single logical JSON request.
//!
//! A `RequestConfig` carries everything the client needs to issue one request:
//! the target URL, the JSON body, a per-attempt timeout and the retry policy.
//!
//! # Example
//!
//! ```ignore
//! let config = RequestConfig::new("/api/echo", json!({ "q": "hi" }))
//!     .with_timeout_ms(5_000)
//!     .with_max_attempts(3);
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Smallest accepted per-attempt timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Default attempt count (no retry).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default backoff unit; the delay after attempt `n` is `2^n` units.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1_000);

/// Predicate deciding whether an HTTP status is worth retrying.
pub type StatusPredicate = Arc<dyn Fn(u16) -> bool + Send + Sync>;

/// Default retry predicate: server errors (5xx and above).
pub fn default_retryable_status(status: u16) -> bool {
    status >= 500
}

/// Configuration for one logical request.
#[derive(Clone)]
pub struct RequestConfig {
    /// Target URL. Opaque to the client; only checked for emptiness.
    pub url: String,
    /// JSON body sent with the request.
    pub body: Value,
    /// Deadline for each individual attempt. Always at least `MIN_TIMEOUT`.
    pub timeout: Duration,
    /// Total attempts allowed, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Unit for exponential backoff between attempts.
    pub backoff_base: Duration,
    retryable_status: StatusPredicate,
}

impl RequestConfig {
    /// Creates a configuration with default timeout and no retry.
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            body,
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
            retryable_status: Arc::new(default_retryable_status),
        }
    }

    /// Sets the per-attempt timeout. Values below `MIN_TIMEOUT` are raised to it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    /// Sets the per-attempt timeout in milliseconds.
    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Sets the total number of attempts. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the backoff unit.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Replaces the predicate deciding which HTTP statuses are retried.
    pub fn with_retryable_status<F>(mut self, predicate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        self.retryable_status = Arc::new(predicate);
        self
    }

    /// Returns true if a response with this status may be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        (self.retryable_status)(status)
    }

    /// Returns true if the URL is empty or whitespace.
    pub fn has_empty_url(&self) -> bool {
        self.url.trim().is_empty()
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base", &self.backoff_base)
            .finish_non_exhaustive()
    }
}
