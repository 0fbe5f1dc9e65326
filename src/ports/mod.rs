//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `HttpTransport` - Raw JSON POST exchange used by the request client

mod http_transport;

pub use http_transport::{HttpTransport, TransportError, TransportResponse};
