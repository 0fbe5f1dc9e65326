//! Mock HTTP Transport for testing.
//!
//! Provides a scripted implementation of the HttpTransport port, allowing
//! the request client to be tested without a server.
//!
//! # Features
//!
//! - Pre-configured replies (consumed in order)
//! - Simulated latency and hanging requests for timeout testing
//! - Transport error injection
//! - Call tracking with timestamps for backoff verification
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new()
//!     .with_json(503, json!({"error": "busy"}))
//!     .with_json(200, json!({"ok": true}));
//!
//! let client = RequestClient::new(transport.clone());
//! let outcome = client.send(&config).await;
//! assert_eq!(transport.call_count(), 2);
//! ```
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned. This adapter is for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

use crate::ports::{HttpTransport, TransportError, TransportResponse};

/// Scripted HTTP transport.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Replies consumed in order.
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A configured reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Respond with a status and raw body.
    Respond { status: u16, body: Vec<u8> },
    /// Fail at the transport level.
    Fail(TransportError),
    /// Never respond.
    Hang,
}

/// One request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub body: Value,
    /// When the call started (tokio clock, so paused-time tests are exact).
    pub at: Instant,
}

impl MockTransport {
    /// Creates a mock with no scripted replies.
    ///
    /// When the script runs out, the mock answers `200 {}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply.
    pub fn with_json(self, status: u16, body: Value) -> Self {
        self.with_raw(status, body.to_string())
    }

    /// Queues a reply with a raw body.
    pub fn with_raw(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(MockReply::Respond {
            status,
            body: body.into(),
        })
    }

    /// Queues the same JSON reply `times` times.
    pub fn with_repeated_json(self, times: usize, status: u16, body: Value) -> Self {
        (0..times).fold(self, |mock, _| mock.with_json(status, body.clone()))
    }

    /// Queues a transport failure.
    pub fn with_error(self, error: TransportError) -> Self {
        self.push(MockReply::Fail(error))
    }

    /// Queues a request that never completes.
    pub fn with_hang(self) -> Self {
        self.push(MockReply::Hang)
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("MockTransport: calls lock poisoned").len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .expect("MockTransport: calls lock poisoned")
            .clone()
    }

    /// Gaps between consecutive call start times.
    pub fn call_gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }

    fn push(self, reply: MockReply) -> Self {
        self.replies
            .lock()
            .expect("MockTransport: replies lock poisoned")
            .push_back(reply);
        self
    }

    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .expect("MockTransport: replies lock poisoned")
            .pop_front()
            .unwrap_or_else(|| MockReply::Respond {
                status: 200,
                body: b"{}".to_vec(),
            })
    }
}

/// Canonical reason phrase for a status, or empty.
fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .expect("MockTransport: calls lock poisoned")
            .push(RecordedCall {
                url: url.to_string(),
                body: body.clone(),
                at: Instant::now(),
            });

        let reply = self.next_reply();

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match reply {
            MockReply::Respond { status, body } => Ok(TransportResponse::new(
                status,
                reason_phrase(status),
                body,
            )),
            MockReply::Fail(error) => Err(error),
            MockReply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_in_order_then_default() {
        let mock = MockTransport::new()
            .with_json(503, json!({"error": "busy"}))
            .with_raw(200, "plain");

        let first = mock.post_json("/a", &Value::Null).await.unwrap();
        assert_eq!(first.status, 503);
        assert_eq!(first.status_text, "Service Unavailable");

        let second = mock.post_json("/a", &Value::Null).await.unwrap();
        assert_eq!(second.body, b"plain".to_vec());

        let third = mock.post_json("/a", &Value::Null).await.unwrap();
        assert_eq!(third.status, 200);
        assert_eq!(third.body, b"{}".to_vec());
    }

    #[tokio::test]
    async fn injects_transport_errors() {
        let mock = MockTransport::new().with_error(TransportError::connect("refused"));
        let result = mock.post_json("/a", &Value::Null).await;
        assert_eq!(result, Err(TransportError::connect("refused")));
    }

    #[tokio::test]
    async fn records_calls() {
        let mock = MockTransport::new();
        mock.post_json("/one", &json!({"q": 1})).await.unwrap();
        mock.post_json("/two", &json!({"q": 2})).await.unwrap();

        let calls = mock.calls();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(calls[0].url, "/one");
        assert_eq!(calls[1].body, json!({"q": 2}));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockTransport::new().with_json(201, json!({}));
        let clone = mock.clone();

        let response = clone.post_json("/a", &Value::Null).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn repeated_json_is_queued() {
        let mock = MockTransport::new().with_repeated_json(3, 500, json!({}));
        for _ in 0..3 {
            let response = mock.post_json("/a", &Value::Null).await.unwrap();
            assert_eq!(response.status, 500);
        }
        let response = mock.post_json("/a", &Value::Null).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
