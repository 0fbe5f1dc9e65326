//! HTTP Transport Port - Interface for the raw JSON POST exchange.
//!
//! The request client owns timeouts, retries and response interpretation.
//! A transport only moves one request over the wire and hands back the
//! status line and raw body, so the client can be exercised against a
//! scripted transport in tests.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct CannedTransport;
//!
//! #[async_trait]
//! impl HttpTransport for CannedTransport {
//!     async fn post_json(
//!         &self,
//!         _url: &str,
//!         _body: &Value,
//!     ) -> Result<TransportResponse, TransportError> {
//!         Ok(TransportResponse::new(200, "OK", br#"{"ok":true}"#.to_vec()))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

/// Port for sending a JSON POST request.
///
/// Implementations must not retry or interpret status codes; a non-2xx
/// response is still `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `body` as JSON to `url` with a JSON content-type header.
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase (e.g. "Bad Gateway"); may be empty.
    pub status_text: String,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a new response.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Transport-level failures (no usable response).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Could not connect (DNS failure, refused connection).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport's own deadline elapsed.
    #[error("transport timed out")]
    TimedOut,

    /// Request was aborted or failed mid-flight.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// Creates a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}
