//! Advisor API - typed calls for the advisor backend's tool endpoints.
//!
//! Each endpoint has its own payload shape. The request client treats bodies
//! as opaque JSON, so shapes are normalized here at the call site: the
//! wrapper validates input, sends the request, and extracts the single field
//! the UI renders. The tool's operation id is marked loading for the duration
//! of the call and receives the final error, including a missing field.
//!
//! | Tool                 | Path                     | Response field  |
//! |----------------------|--------------------------|-----------------|
//! | Contract simplifier  | `/api/contract/simplify` | `summary`       |
//! | Content checker      | `/api/content/check`     | `report`        |
//! | Invoice generator    | `/api/invoice/generate`  | `invoice_text`  |
//! | Policy advisor       | `/api/youtube/policy`    | `answer`        |
//! | Ask me anything      | `/api/ama/ask`           | `answer`        |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::domain::request::{FailureKind, RequestFailure, RequestOutcome};
use crate::ports::TransportError;

use super::operation_registry::OperationRegistry;
use super::request_client::RequestClient;

/// Operation ids used by the advisor tools.
pub mod operation_ids {
    pub const CONTRACT_ANALYZER: &str = "contract-analyzer";
    pub const CONTENT_CHECKER: &str = "content-checker";
    pub const INVOICE_GENERATOR: &str = "invoice-generator";
    pub const POLICY_ADVISOR: &str = "policy-advisor";
    pub const AMA: &str = "ama";
}

/// Endpoint paths.
mod paths {
    pub const CONTRACT_SIMPLIFY: &str = "/api/contract/simplify";
    pub const CONTENT_CHECK: &str = "/api/content/check";
    pub const INVOICE_GENERATE: &str = "/api/invoice/generate";
    pub const POLICY: &str = "/api/youtube/policy";
    pub const AMA: &str = "/api/ama/ask";
}

/// Result of an advisor API call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Advisor API errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Input rejected before any request was sent.
    #[error("{0}")]
    InvalidInput(String),

    /// The request failed or returned an unexpected payload.
    #[error(transparent)]
    Request(#[from] RequestFailure),
}

impl ApiError {
    /// Message suitable for an error banner.
    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidInput(message) => message,
            ApiError::Request(failure) => &failure.message,
        }
    }

    /// Failure kind, when a request was made.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ApiError::InvalidInput(_) => None,
            ApiError::Request(failure) => Some(failure.kind),
        }
    }
}

/// Invoice generation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub brand: String,
    pub service: String,
    pub amount: f64,
    #[serde(default)]
    pub include_gst: bool,
}

impl InvoiceRequest {
    /// Creates an invoice request without GST.
    pub fn new(brand: impl Into<String>, service: impl Into<String>, amount: f64) -> Self {
        Self {
            brand: brand.into(),
            service: service.into(),
            amount,
            include_gst: false,
        }
    }

    /// Sets whether GST is added.
    pub fn with_gst(mut self, include_gst: bool) -> Self {
        self.include_gst = include_gst;
        self
    }

    fn validate(&self) -> ApiResult<()> {
        if self.brand.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Brand name must be a non-empty string".to_string(),
            ));
        }
        if self.service.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Service description must be a non-empty string".to_string(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ApiError::InvalidInput(
                "Amount must be a positive number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Typed client for the advisor tools.
#[derive(Clone)]
pub struct AdvisorApi {
    client: RequestClient,
    registry: OperationRegistry,
    config: ClientConfig,
}

impl AdvisorApi {
    /// Creates the API over an existing client and registry.
    pub fn new(client: RequestClient, registry: OperationRegistry, config: ClientConfig) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Creates the API backed by `reqwest`.
    pub fn with_reqwest(
        registry: OperationRegistry,
        config: ClientConfig,
    ) -> Result<Self, TransportError> {
        Ok(Self::new(RequestClient::with_reqwest()?, registry, config))
    }

    /// Registry that mirrors every call's state.
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Simplifies contract text into a plain-language summary.
    pub async fn simplify_contract(&self, text: &str) -> ApiResult<String> {
        self.text_call(
            operation_ids::CONTRACT_ANALYZER,
            paths::CONTRACT_SIMPLIFY,
            json!({ "text": text }),
            non_empty(text, "Contract text cannot be empty"),
            "summary",
        )
        .await
    }

    /// Checks content for safety and policy compliance.
    pub async fn check_content(&self, text: &str) -> ApiResult<String> {
        self.text_call(
            operation_ids::CONTENT_CHECKER,
            paths::CONTENT_CHECK,
            json!({ "text": text }),
            non_empty(text, "Content text cannot be empty"),
            "report",
        )
        .await
    }

    /// Generates formatted invoice text.
    pub async fn generate_invoice(&self, invoice: &InvoiceRequest) -> ApiResult<String> {
        let body = json!({
            "brand": invoice.brand,
            "service": invoice.service,
            "amount": invoice.amount,
            "include_gst": invoice.include_gst,
        });
        self.text_call(
            operation_ids::INVOICE_GENERATOR,
            paths::INVOICE_GENERATE,
            body,
            invoice.validate(),
            "invoice_text",
        )
        .await
    }

    /// Answers a platform-policy question.
    pub async fn ask_policy(&self, question: &str) -> ApiResult<String> {
        self.text_call(
            operation_ids::POLICY_ADVISOR,
            paths::POLICY,
            json!({ "question": question }),
            non_empty(question, "Policy question cannot be empty"),
            "answer",
        )
        .await
    }

    /// Answers an open question from the knowledge base.
    pub async fn ask_ama(&self, question: &str) -> ApiResult<String> {
        self.text_call(
            operation_ids::AMA,
            paths::AMA,
            json!({ "question": question }),
            non_empty(question, "Question cannot be empty"),
            "answer",
        )
        .await
    }

    async fn text_call(
        &self,
        id: &str,
        path: &str,
        body: Value,
        validation: ApiResult<()>,
        field: &str,
    ) -> ApiResult<String> {
        if let Err(err) = validation {
            tracing::debug!(operation = id, "Rejected input: {}", err);
            self.registry.set_error(id, err.message());
            self.registry.set_loading(id, false);
            return Err(err);
        }

        let request = self.config.request(path, body);
        let _loading = self.registry.start_loading(id);
        self.registry.clear_error(id);

        let result = match self.client.send(&request).await {
            RequestOutcome::Success { status, data, .. } => extract_text(&data, field)
                .map_err(|failure| ApiError::Request(failure.with_status(status))),
            RequestOutcome::Failure(failure) => Err(ApiError::Request(failure)),
        };

        // Field extraction decides the outcome before anything is mirrored.
        match &result {
            Ok(_) => self.registry.clear_error(id),
            Err(err) => self.registry.set_error(id, err.message()),
        }
        result
    }
}

fn non_empty(value: &str, message: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidInput(message.to_string()))
    } else {
        Ok(())
    }
}

/// Pulls a text field out of a response, rendering non-string JSON compactly.
fn extract_text(data: &Value, field: &str) -> Result<String, RequestFailure> {
    match data.get(field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Err(RequestFailure::parse(format!(
            "Response is missing the '{}' field",
            field
        ))),
        Some(other) => Ok(other.to_string()),
    }
}
