//! Operation domain - state tracked per caller-chosen operation id.

mod record;

pub use record::{OperationRecord, OperationState};
