//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `transport` - HTTP transports (reqwest, scripted mock)

pub mod transport;

pub use transport::{MockTransport, ReqwestTransport};
