//! Request Client - resilient JSON requests with timeout, cancellation and retry.
//!
//! Every call resolves to a `RequestOutcome`; nothing is returned as `Err`
//! and nothing panics.
//!
//! # Attempt lifecycle
//!
//! ```text
//! attempt n ──► post_json under per-attempt timeout
//!     ├─ 2xx + JSON body ─────────────► Success
//!     ├─ 2xx + bad body ──────────────► Failure(ParseError)      (final)
//!     ├─ non-2xx ─────────────────────► Failure(HttpError)       (retried if status predicate matches)
//!     ├─ deadline elapsed ────────────► Failure(Timeout)         (retried)
//!     └─ transport error ─────────────► Failure(NetworkError)    (retried)
//! retry: sleep 2^n * backoff_base, then attempt n + 1, while n < max_attempts
//! ```
//!
//! # Example
//!
//! ```ignore
//! let client = RequestClient::with_reqwest()?;
//! let config = RequestConfig::new("http://localhost:5000/api/echo", json!({"q": "hi"}))
//!     .with_timeout_ms(5_000);
//!
//! match client.send(&config).await {
//!     RequestOutcome::Success { data, .. } => println!("{}", data),
//!     RequestOutcome::Failure(failure) => eprintln!("{}", failure.message),
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use crate::adapters::transport::ReqwestTransport;
use crate::domain::request::{
    backoff_delay, should_retry, RequestConfig, RequestFailure, RequestOutcome, MIN_TIMEOUT,
};
use crate::ports::{HttpTransport, TransportError, TransportResponse};

use super::cancellation::CancelToken;
use super::operation_registry::OperationRegistry;

/// Message for a caller-cancelled request.
const CANCELLED_MESSAGE: &str = "Request was cancelled";

/// Issues JSON requests over an `HttpTransport`.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
}

impl RequestClient {
    /// Creates a client over the given transport.
    pub fn new(transport: impl HttpTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Creates a client over a shared transport.
    pub fn from_shared(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Creates a client backed by `reqwest`.
    pub fn with_reqwest() -> Result<Self, TransportError> {
        Ok(Self::new(ReqwestTransport::new()?))
    }

    /// Sends the request, retrying transient failures per `config`.
    pub async fn send(&self, config: &RequestConfig) -> RequestOutcome {
        self.send_cancellable(config, &CancelToken::never()).await
    }

    /// Sends the request; `token` aborts the current attempt or backoff.
    ///
    /// A cancelled request resolves to `Failure(NetworkError)` and is not
    /// retried.
    pub async fn send_cancellable(
        &self,
        config: &RequestConfig,
        token: &CancelToken,
    ) -> RequestOutcome {
        if config.has_empty_url() {
            tracing::warn!("Refusing to send request with empty URL");
            return RequestFailure::network("Request URL is empty")
                .with_attempts(0)
                .into();
        }

        let request_id = Uuid::new_v4();
        let max_attempts = config.max_attempts.max(1);
        let mut token = token.clone();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                %request_id,
                url = %config.url,
                attempt,
                max_attempts,
                "Sending request"
            );

            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Self::cancelled(request_id, attempt);
                }
                result = self.attempt(config) => result,
            };

            let failure = match result {
                Ok((status, data)) => {
                    tracing::debug!(%request_id, status, attempt, "Request succeeded");
                    return RequestOutcome::success(status, data, attempt);
                }
                Err(failure) => failure.with_attempts(attempt),
            };

            if !should_retry(&failure, config, attempt) {
                tracing::warn!(
                    %request_id,
                    kind = %failure.kind,
                    status = ?failure.status,
                    attempt,
                    "Request failed: {}",
                    failure.message
                );
                return failure.into();
            }

            let delay = backoff_delay(attempt, config.backoff_base);
            tracing::warn!(
                %request_id,
                kind = %failure.kind,
                status = ?failure.status,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, retrying: {}",
                failure.message
            );

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    return Self::cancelled(request_id, attempt);
                }
                _ = sleep(delay) => {}
            }
        }
    }

    /// Sends the request and mirrors its state into `registry` under `id`.
    ///
    /// Marks the id loading and clears its error, then on completion records
    /// the failure message (or clears the error) before clearing loading.
    /// Dropping the future mid-flight also clears loading.
    pub async fn send_tracked(
        &self,
        registry: &OperationRegistry,
        id: &str,
        config: &RequestConfig,
    ) -> RequestOutcome {
        self.send_tracked_cancellable(registry, id, config, &CancelToken::never())
            .await
    }

    /// `send_tracked` with caller-triggered cancellation.
    pub async fn send_tracked_cancellable(
        &self,
        registry: &OperationRegistry,
        id: &str,
        config: &RequestConfig,
        token: &CancelToken,
    ) -> RequestOutcome {
        let _loading = registry.start_loading(id);
        registry.clear_error(id);

        let outcome = self.send_cancellable(config, token).await;

        match outcome.failure() {
            Some(failure) => registry.set_error(id, failure.message.clone()),
            None => registry.clear_error(id),
        }

        outcome
    }

    /// One attempt under the per-attempt deadline.
    async fn attempt(&self, config: &RequestConfig) -> Result<(u16, Value), RequestFailure> {
        let exchange = self.transport.post_json(&config.url, &config.body);

        let deadline = config.timeout.max(MIN_TIMEOUT);

        match timeout(deadline, exchange).await {
            Err(_) => Err(RequestFailure::timeout(deadline)),
            Ok(Err(TransportError::TimedOut)) => Err(RequestFailure::timeout(deadline)),
            Ok(Err(err)) => Err(RequestFailure::network(err.to_string())),
            Ok(Ok(response)) => interpret_response(&response),
        }
    }

    fn cancelled(request_id: Uuid, attempt: u32) -> RequestOutcome {
        tracing::debug!(%request_id, attempt, "Request cancelled");
        RequestFailure::network(CANCELLED_MESSAGE)
            .with_attempts(attempt)
            .into()
    }
}

/// Error body shape returned by the backend: `{error, details?}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    details: Option<Value>,
}

/// Turns a raw response into parsed data or a failure.
fn interpret_response(response: &TransportResponse) -> Result<(u16, Value), RequestFailure> {
    if response.is_success() {
        return serde_json::from_slice::<Value>(&response.body)
            .map(|data| (response.status, data))
            .map_err(|e| {
                RequestFailure::parse(format!("Failed to parse response body as JSON: {}", e))
                    .with_status(response.status)
            });
    }

    let parsed = serde_json::from_slice::<ErrorBody>(&response.body).ok();
    let message = parsed
        .as_ref()
        .and_then(|body| body.error.as_ref())
        .and_then(error_message)
        .unwrap_or_else(|| fallback_message(response));
    let details = parsed.and_then(|body| body.details).and_then(render_details);

    Err(RequestFailure::http(response.status, message, details))
}

/// Extracts a message from `error`, accepting a string or `{message}`.
fn error_message(error: &Value) -> Option<String> {
    let text = match error {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("message")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn render_details(details: Value) -> Option<String> {
    match details {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn fallback_message(response: &TransportResponse) -> String {
    format!("Server error: {} {}", response.status, response.status_text)
        .trim_end()
        .to_string()
}
