//! Domain layer containing the request and operation types.
//!
//! # Module Organization
//!
//! - `request` - Request configuration, outcomes and retry policy
//! - `operation` - Loading/error records tracked per operation id

pub mod operation;
pub mod request;
