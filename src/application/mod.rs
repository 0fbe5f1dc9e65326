//! Application layer - request orchestration and operation tracking.
//!
//! `RequestClient` drives attempts over the `HttpTransport` port, the
//! `OperationRegistry` mirrors per-operation state for UI surfaces, and
//! `AdvisorApi` wraps the backend's tool endpoints on top of both.

mod advisor_api;
mod cancellation;
mod operation_registry;
mod request_client;

pub use advisor_api::{operation_ids, AdvisorApi, ApiError, ApiResult, InvoiceRequest};
pub use cancellation::{cancellation, CancelHandle, CancelToken};
pub use operation_registry::{LoadingGuard, OperationChange, OperationRegistry};
pub use request_client::RequestClient;
