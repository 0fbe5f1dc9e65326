//! Reqwest Transport - Implementation of HttpTransport over `reqwest`.
//!
//! The underlying `reqwest::Client` is built without a request timeout; the
//! request client applies its own per-attempt deadline and drops the
//! in-flight future when it fires, which aborts the connection.
//!
//! # Example
//!
//! ```ignore
//! let transport = ReqwestTransport::new()?;
//! let client = RequestClient::new(transport);
//! ```

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::ports::{HttpTransport, TransportError, TransportResponse};

/// Connect timeout applied to new connections.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("advisor-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Maps a reqwest error to a transport error.
    fn classify(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::TimedOut
        } else if err.is_connect() {
            TransportError::connect(err.to_string())
        } else {
            TransportError::network(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<TransportResponse, TransportError> {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(Self::classify)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let bytes = response.bytes().await.map_err(Self::classify)?;

        Ok(TransportResponse::new(status.as_u16(), status_text, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_default_client() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[tokio::test]
    async fn invalid_url_is_a_network_error() {
        let transport = ReqwestTransport::new().unwrap();
        let result = transport.post_json("not a url", &Value::Null).await;

        assert!(matches!(
            result,
            Err(TransportError::Network(_)) | Err(TransportError::Connect(_))
        ));
    }
}
