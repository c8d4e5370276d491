//! Flush counters.
//!
//! Flush failures never reach `record` callers, so these counters (together
//! with the logs) are how they are observed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared between the worker and the checkpoint handle.
#[derive(Debug, Default)]
pub(crate) struct FlushCounters {
    updates_applied: AtomicU64,
    flushes: AtomicU64,
    failed_flushes: AtomicU64,
}

impl FlushCounters {
    pub(crate) fn record_update(&self) {
        self.updates_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_flush(&self) {
        self.failed_flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn load(&self) -> FlushStats {
        FlushStats {
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            failed_flushes: self.failed_flushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the flush counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Updates the worker has applied to the state table.
    pub updates_applied: u64,
    /// Snapshots successfully written to disk.
    pub flushes: u64,
    /// Flush attempts that failed and will be retried.
    pub failed_flushes: u64,
}
