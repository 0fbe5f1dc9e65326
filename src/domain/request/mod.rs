//! Request domain - configuration, outcomes and retry policy for JSON requests.

mod config;
mod outcome;
mod retry;

pub use config::{
    default_retryable_status, RequestConfig, StatusPredicate, DEFAULT_BACKOFF_BASE,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT, MIN_TIMEOUT,
};
pub use outcome::{FailureKind, RequestFailure, RequestOutcome};
pub use retry::{backoff_delay, is_transient, should_retry};
