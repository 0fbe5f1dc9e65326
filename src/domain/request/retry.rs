//! Retry policy: which failures are transient and how long to wait.

use std::time::Duration;

use super::{FailureKind, RequestConfig, RequestFailure};

/// Delay before the attempt following `attempt` (1-based): `2^attempt * base`.
///
/// Saturates instead of overflowing for absurd attempt counts.
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Returns true if the failure is transient under this configuration.
///
/// Timeouts and network errors are always transient. HTTP errors are
/// transient only when the config's status predicate accepts them.
/// Parse errors never are.
pub fn is_transient(failure: &RequestFailure, config: &RequestConfig) -> bool {
    match failure.kind {
        FailureKind::Timeout | FailureKind::NetworkError => true,
        FailureKind::HttpError => failure
            .status
            .is_some_and(|status| config.is_retryable_status(status)),
        FailureKind::ParseError => false,
    }
}

/// Returns true if another attempt should follow attempt number `attempt`.
pub fn should_retry(failure: &RequestFailure, config: &RequestConfig, attempt: u32) -> bool {
    attempt < config.max_attempts && is_transient(failure, config)
}
