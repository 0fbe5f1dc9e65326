//! Request client configuration

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::request::RequestConfig;

/// Backend endpoint and default request policy
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the advisor backend (e.g. `http://localhost:5000`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl ClientConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get backoff unit as Duration
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Join the base URL and an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build a request for `path` using this config's policy
    pub fn request(&self, path: &str, body: Value) -> RequestConfig {
        RequestConfig::new(self.endpoint(path), body)
            .with_timeout(self.timeout())
            .with_max_attempts(self.max_attempts)
            .with_backoff_base(self.backoff_base())
    }

    /// Validate client configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingRequired("CLIENT__BASE_URL"));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_base_ms() -> u64 {
    1_000
}
