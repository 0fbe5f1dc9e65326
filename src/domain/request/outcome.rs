//! Request outcomes - the value every request resolves to.
//!
//! The client never raises: success and every failure mode are returned as a
//! `RequestOutcome` so call sites can render a result without a separate
//! error path for each internal failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No response was obtained (DNS, refused connection, aborted).
    NetworkError,
    /// The client-side deadline elapsed before a response arrived.
    Timeout,
    /// The server responded with a status outside 2xx.
    HttpError,
    /// A 2xx response body was not valid JSON.
    ParseError,
}

impl FailureKind {
    /// Message used when a failure would otherwise carry no text.
    fn fallback_message(&self) -> &'static str {
        match self {
            FailureKind::NetworkError => "Network error: no response received",
            FailureKind::Timeout => "Request timed out",
            FailureKind::HttpError => "Server error",
            FailureKind::ParseError => "Response could not be parsed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::NetworkError => "NetworkError",
            FailureKind::Timeout => "Timeout",
            FailureKind::HttpError => "HttpError",
            FailureKind::ParseError => "ParseError",
        };
        write!(f, "{}", s)
    }
}

/// A failed request.
///
/// `message` is always non-empty and readable by a person.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// HTTP status, present for `HttpError`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Extra detail supplied by the server's error body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Attempts made before giving up.
    pub attempts: u32,
}

impl RequestFailure {
    /// Creates a failure of the given kind.
    ///
    /// An empty message is replaced by a generic one for the kind.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            kind.fallback_message().to_string()
        } else {
            message
        };

        Self {
            kind,
            message,
            status: None,
            details: None,
            attempts: 1,
        }
    }

    /// Creates a network failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NetworkError, message)
    }

    /// Creates a timeout failure for the given deadline.
    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("Request timed out after {} ms", after.as_millis()),
        )
    }

    /// Creates an HTTP failure.
    pub fn http(status: u16, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: Some(status),
            details,
            ..Self::new(FailureKind::HttpError, message)
        }
    }

    /// Creates a parse failure.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ParseError, message)
    }

    /// Sets the number of attempts made.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Result of one logical request, across all of its attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// 2xx response with a JSON body.
    Success {
        /// HTTP status in [200, 299].
        status: u16,
        /// Parsed response body.
        data: Value,
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// Any failure mode.
    Failure(RequestFailure),
}

impl RequestOutcome {
    /// Creates a success outcome.
    pub fn success(status: u16, data: Value, attempts: u32) -> Self {
        Self::Success {
            status,
            data,
            attempts,
        }
    }

    /// Returns true for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    /// HTTP status, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestOutcome::Success { status, .. } => Some(*status),
            RequestOutcome::Failure(failure) => failure.status,
        }
    }

    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RequestOutcome::Success { attempts, .. } => *attempts,
            RequestOutcome::Failure(failure) => failure.attempts,
        }
    }

    /// Failure details, if this is a failure.
    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            RequestOutcome::Success { .. } => None,
            RequestOutcome::Failure(failure) => Some(failure),
        }
    }

    /// Converts into a `Result` over the response body.
    pub fn into_result(self) -> Result<Value, RequestFailure> {
        match self {
            RequestOutcome::Success { data, .. } => Ok(data),
            RequestOutcome::Failure(failure) => Err(failure),
        }
    }
}

impl From<RequestFailure> for RequestOutcome {
    fn from(failure: RequestFailure) -> Self {
        RequestOutcome::Failure(failure)
    }
}
