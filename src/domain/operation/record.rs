//! Per-operation loading/error bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Loading flag and last error for one operation id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// True while the operation is in flight.
    pub loading: bool,
    /// Last error message, if the operation failed.
    pub error: Option<String>,
}

impl OperationRecord {
    /// Derived lifecycle state.
    pub fn state(&self) -> OperationState {
        match (self.loading, self.error.is_some()) {
            (true, _) => OperationState::Loading,
            (false, true) => OperationState::Errored,
            (false, false) => OperationState::Idle,
        }
    }
}

/// Lifecycle state of an operation id.
///
/// ```text
/// Idle --set_loading(true)--> Loading --set_loading(false)--> Idle | Errored
/// Errored --set_loading(true)--> Loading
/// ```
///
/// `Idle` and `Errored` are both "not loading" and differ only in whether an
/// error is recorded. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    #[default]
    Idle,
    Loading,
    Errored,
}

impl OperationState {
    /// Returns true while the operation is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Loading)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationState::Idle => "Idle",
            OperationState::Loading => "Loading",
            OperationState::Errored => "Errored",
        };
        write!(f, "{}", s)
    }
}
