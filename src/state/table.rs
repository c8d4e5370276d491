//! Concurrency-safe table of per-source state.
//!
//! The table is shared between the flush worker (the only writer) and any
//! number of readers calling [`StateTable::snapshot`]. Readers always receive
//! an owned copy, never a view into the live map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::{SourceName, SourceState};

/// Mapping from source name to its last known state.
///
/// Cloning a `StateTable` yields another handle to the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    inner: Arc<RwLock<HashMap<SourceName, SourceState>>>,
}

impl StateTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table seeded with the given states.
    ///
    /// If a name appears more than once, the later state wins.
    pub fn seeded(states: impl IntoIterator<Item = SourceState>) -> Self {
        let map = states
            .into_iter()
            .map(|state| (state.name.clone(), state))
            .collect();

        StateTable {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Stores `state`, replacing any previous entry with the same name.
    pub fn update(&self, state: SourceState) {
        self.write().insert(state.name.clone(), state);
    }

    /// Returns an independent copy of every entry.
    pub fn snapshot(&self) -> HashMap<SourceName, SourceState> {
        self.read().clone()
    }

    /// Returns a copy of the entry for `name`, if any.
    pub fn get(&self, name: &str) -> Option<SourceState> {
        self.read().get(name).cloned()
    }

    /// Returns the number of tracked sources.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no sources are tracked.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A writer only ever replaces whole entries, so a map left behind by a
    // panicking holder is still consistent and safe to keep using.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SourceName, SourceState>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SourceName, SourceState>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
