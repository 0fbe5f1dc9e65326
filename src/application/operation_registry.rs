//! In-memory registry of named asynchronous operations.
//!
//! Independent UI surfaces report and observe the loading/error state of
//! concurrent operations through one shared registry, keyed by a
//! caller-chosen operation id (e.g. `"contract-analyzer"`).
//!
//! # Semantics
//!
//! - Records are created lazily on the first `set_loading`/`set_error`
//!   for an id and are never removed.
//! - Unknown ids read as the default record (not loading, no error).
//! - No call fails or panics. Writes to the same id are last-write-wins.
//!
//! # Example
//!
//! ```ignore
//! let registry = OperationRegistry::new();
//! registry.set_loading("a", true);
//! registry.set_error("a", "boom");
//! assert!(registry.is_loading("a"));
//! assert_eq!(registry.get_error("a").as_deref(), Some("boom"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::domain::operation::{OperationRecord, OperationState};

/// Buffered change notifications per subscriber before it starts lagging.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification emitted after a write changes (or creates) a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationChange {
    /// Operation id that changed.
    pub id: String,
    /// Record after the change.
    pub record: OperationRecord,
}

/// Shared, in-memory operation registry.
///
/// Clones share the same state. Use `OperationRegistry::new()` for an
/// independent registry (one per test, one per application).
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: RwLock<HashMap<String, OperationRecord>>,
    changes: broadcast::Sender<OperationChange>,
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                records: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Sets the loading flag, overwriting it unconditionally.
    pub fn set_loading(&self, id: &str, is_loading: bool) {
        self.upsert(id, |record| record.loading = is_loading);
    }

    /// Marks `id` loading until the returned guard is dropped.
    ///
    /// The guard clears the flag on drop, so an id does not stay loading when
    /// the future holding the guard is aborted or dropped mid-flight.
    pub fn start_loading(&self, id: &str) -> LoadingGuard {
        self.set_loading(id, true);
        LoadingGuard {
            registry: self.clone(),
            id: id.to_string(),
        }
    }

    /// Records an error message. The loading flag is left as is.
    pub fn set_error(&self, id: &str, message: impl Into<String>) {
        let message = message.into();
        self.upsert(id, |record| record.error = Some(message));
    }

    /// Clears the error. No-op for unknown ids or when no error is set.
    pub fn clear_error(&self, id: &str) {
        let change = {
            let mut records = self.write();
            match records.get_mut(id) {
                Some(record) if record.error.is_some() => {
                    record.error = None;
                    Some(OperationChange {
                        id: id.to_string(),
                        record: record.clone(),
                    })
                }
                _ => None,
            }
        };

        if let Some(change) = change {
            self.notify(change);
        }
    }

    /// Returns the loading flag; false for unknown ids.
    pub fn is_loading(&self, id: &str) -> bool {
        self.read().get(id).is_some_and(|record| record.loading)
    }

    /// Returns the last error; `None` for unknown ids.
    pub fn get_error(&self, id: &str) -> Option<String> {
        self.read().get(id).and_then(|record| record.error.clone())
    }

    /// Returns the full record; the default record for unknown ids.
    pub fn record(&self, id: &str) -> OperationRecord {
        self.read().get(id).cloned().unwrap_or_default()
    }

    /// Returns the derived lifecycle state.
    pub fn state(&self, id: &str) -> OperationState {
        self.record(id).state()
    }

    /// Ids currently loading, sorted.
    pub fn loading_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .read()
            .iter()
            .filter(|(_, record)| record.loading)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of ids that have been written.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no id has been written.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Subscribes to change notifications.
    ///
    /// Only writes made after subscribing are delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<OperationChange> {
        self.inner.changes.subscribe()
    }

    /// Applies `apply` to the record for `id`, creating it if needed.
    fn upsert(&self, id: &str, apply: impl FnOnce(&mut OperationRecord)) {
        let change = {
            let mut records = self.write();
            let created = !records.contains_key(id);
            let record = records.entry(id.to_string()).or_default();
            let before = record.clone();
            apply(record);

            (created || *record != before).then(|| OperationChange {
                id: id.to_string(),
                record: record.clone(),
            })
        };

        if let Some(change) = change {
            self.notify(change);
        }
    }

    fn notify(&self, change: OperationChange) {
        // No subscribers is not an error.
        let _ = self.inner.changes.send(change);
    }

    // A poisoned lock still holds consistent data: every write is a single
    // field assignment.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, OperationRecord>> {
        self.inner
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, OperationRecord>> {
        self.inner
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears an id's loading flag when dropped.
#[must_use = "the id stops loading as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard {
    registry: OperationRegistry,
    id: String,
}

impl LoadingGuard {
    /// Operation id held loading by this guard.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.registry.set_loading(&self.id, false);
    }
}
