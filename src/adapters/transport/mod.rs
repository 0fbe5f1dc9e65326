//! HTTP Transport Adapters.
//!
//! Implementations of the HttpTransport port.
//!
//! ## Available Adapters
//!
//! - `ReqwestTransport` - Production transport over `reqwest`
//! - `MockTransport` - Scripted transport for testing

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::{MockReply, MockTransport, RecordedCall};
pub use reqwest_transport::ReqwestTransport;
