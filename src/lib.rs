//! Advisor Core - resilient request layer for the creator advisor tools.
//!
//! Issues JSON POST requests with per-attempt timeouts, exponential-backoff
//! retry and cancellation, normalizes every response into a
//! [`RequestOutcome`], and mirrors per-operation loading/error state into a
//! shared [`OperationRegistry`].

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use application::{
    AdvisorApi, ApiError, CancelHandle, CancelToken, InvoiceRequest,
    OperationRegistry, RequestClient,
};
pub use domain::operation::{OperationRecord, OperationState};
pub use domain::request::{FailureKind, RequestConfig, RequestFailure, RequestOutcome};
