//! Background event loop that owns all state-table mutation.
//!
//! One worker runs per checkpoint. It services three event sources:
//! - Incoming updates via the single-slot hand-off channel
//! - The flush timer
//! - The shutdown cancellation token
//!
//! # Flush Triggers
//!
//! After each applied update the worker checks the update-count threshold.
//! Independently, the flush timer fires after `flush_interval`. Either trigger
//! calls [`FlushWorker::persist`], and the timer is re-armed after every
//! attempt whether or not it wrote anything.
//!
//! # Shutdown
//!
//! On cancellation the worker closes the channel, applies any update already
//! handed off, performs one final flush if dirty, and exits.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace};

use crate::persistence::snapshot::{Snapshot, save_snapshot_atomic};
use crate::state::StateTable;
use crate::types::SourceState;

use super::policy::FlushPolicy;
use super::stats::FlushCounters;

/// Capacity of the update hand-off channel.
///
/// At most one update waits between callers and the worker; further senders
/// are held back until it is drained.
pub const HANDOFF_CAPACITY: usize = 1;

/// Furthest the flush timer is ever armed (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline `interval` from now, capped at [`FAR_FUTURE`].
fn deadline_after(interval: Duration) -> Instant {
    Instant::now() + interval.min(FAR_FUTURE)
}

/// Worker state.
///
/// The worker is the sole writer to its [`StateTable`] and the sole user of
/// the checkpoint file.
pub struct FlushWorker {
    /// File the snapshot is written to.
    path: PathBuf,

    /// When to flush.
    policy: FlushPolicy,

    /// State shared with readers.
    table: StateTable,

    /// Updates applied since the last successful flush.
    pending_updates: usize,

    /// Counters shared with the checkpoint handle.
    counters: Arc<FlushCounters>,
}

impl FlushWorker {
    pub(crate) fn new(
        path: impl Into<PathBuf>,
        policy: FlushPolicy,
        table: StateTable,
        counters: Arc<FlushCounters>,
    ) -> Self {
        FlushWorker {
            path: path.into(),
            policy,
            table,
            pending_updates: 0,
            counters,
        }
    }

    /// Returns the checkpoint file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of updates not yet flushed.
    pub fn pending_updates(&self) -> usize {
        self.pending_updates
    }

    /// Applies one update to the state table.
    pub fn apply(&mut self, state: SourceState) {
        trace!(source = %state.name, position = %state.position, "Applying update");
        self.table.update(state);
        self.pending_updates += 1;
        self.counters.record_update();
    }

    /// Writes the state table to disk if any updates are pending.
    ///
    /// Returns `true` if a snapshot was written. On failure the pending count
    /// is kept so the next trigger retries.
    pub fn persist(&mut self) -> bool {
        if self.pending_updates == 0 {
            return false;
        }

        let snapshot = Snapshot::now(self.table.snapshot().into_values());

        match save_snapshot_atomic(&self.path, &snapshot) {
            Ok(()) => {
                debug!(
                    pending_updates = self.pending_updates,
                    entries = snapshot.entries.len(),
                    "Checkpoint saved to disk"
                );
                self.pending_updates = 0;
                self.counters.record_flush();
                true
            }
            Err(e) => {
                error!(
                    error = %e,
                    pending_updates = self.pending_updates,
                    "Failed to flush checkpoint to disk"
                );
                self.counters.record_failed_flush();
                false
            }
        }
    }

    // ─── Async Event Loop ─────────────────────────────────────────────────────────

    /// Runs the worker event loop until `shutdown` is cancelled or every
    /// sender has been dropped.
    ///
    /// # Arguments
    ///
    /// * `rx` - Receiving half of the update hand-off channel
    /// * `shutdown` - Cancellation token for graceful shutdown
    #[instrument(skip(self, rx, shutdown), fields(path = %self.path.display()))]
    pub async fn run(mut self, mut rx: mpsc::Receiver<SourceState>, shutdown: CancellationToken) {
        info!(
            max_updates = self.policy.max_updates(),
            flush_interval = ?self.policy.flush_interval(),
            "Checkpoint worker started"
        );

        let flush_timer = sleep_until(deadline_after(self.policy.flush_interval()));
        tokio::pin!(flush_timer);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping checkpoint worker");
                    break;
                }

                msg = rx.recv() => {
                    match msg {
                        Some(state) => {
                            self.apply(state);
                            if !self.policy.count_reached(self.pending_updates) {
                                continue;
                            }
                        }
                        None => {
                            info!("Update channel closed");
                            break;
                        }
                    }
                }

                _ = &mut flush_timer => {}
            }

            self.persist();
            flush_timer
                .as_mut()
                .reset(deadline_after(self.policy.flush_interval()));
        }

        // Anything already handed off was accepted; apply it before the final flush.
        rx.close();
        while let Ok(state) = rx.try_recv() {
            self.apply(state);
        }

        self.persist();
        info!(pending_updates = self.pending_updates, "Checkpoint worker stopped");
    }
}
