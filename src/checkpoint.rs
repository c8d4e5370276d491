//! The checkpoint handle: bootstrap, recording, reads and shutdown.
//!
//! # Lifecycle
//!
//! 1. [`Checkpoint::open`] loads any existing snapshot and seeds the state table
//! 2. A [`FlushWorker`] task is spawned on the current tokio runtime
//! 3. Callers report positions with [`Checkpoint::record`]
//! 4. [`Checkpoint::close`] stops the worker after a final flush
//!
//! Recording never fails. Flush failures are logged, counted in
//! [`FlushStats`], and retried at the next trigger; the file on disk keeps the
//! last snapshot that was written successfully.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::CheckpointConfig;
use crate::persistence::snapshot::{SnapshotError, try_load_snapshot};
use crate::state::StateTable;
use crate::types::{Position, SourceName, SourceState};
use crate::worker::stats::FlushCounters;
use crate::worker::{FlushPolicy, FlushStats, FlushWorker, HANDOFF_CAPACITY};

/// Errors that can occur when opening a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint file exists but could not be read or parsed.
    #[error("failed to load checkpoint {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },

    /// `open` was called outside a tokio runtime.
    #[error("checkpoint requires a running tokio runtime")]
    NoRuntime,
}

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Persists per-source positions to disk.
///
/// A `Checkpoint` is safe to share between tasks (wrap it in an `Arc`). All
/// updates are funnelled through one background worker in the order they are
/// handed off.
///
/// Dropping an open checkpoint signals its worker to stop; the worker still
/// performs its final flush if the runtime keeps running. Use
/// [`close`](Self::close) to wait for that flush.
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    policy: FlushPolicy,
    table: StateTable,
    tx: mpsc::Sender<SourceState>,
    shutdown: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<FlushCounters>,
}

impl Checkpoint {
    /// Opens the checkpoint at `path`.
    ///
    /// `max_updates` is the number of updates that triggers a flush and
    /// `flush_interval` the longest time between flushes; they are clamped to
    /// at least 1 and one second respectively.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Load`] if the file exists but is not a valid
    /// snapshot, and [`CheckpointError::NoRuntime`] outside a tokio runtime.
    pub fn open(
        path: impl Into<PathBuf>,
        max_updates: usize,
        flush_interval: Duration,
    ) -> Result<Self> {
        Self::open_with_config(
            CheckpointConfig::new(path).with_thresholds(max_updates, flush_interval),
        )
    }

    /// Opens a checkpoint from a [`CheckpointConfig`].
    pub fn open_with_config(config: CheckpointConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CheckpointError::NoRuntime)?;
        let CheckpointConfig { path, policy } = config;

        let table = match try_load_snapshot(&path) {
            Ok(Some(snapshot)) => {
                info!(
                    path = %path.display(),
                    entries = snapshot.entries.len(),
                    saved_at = %snapshot.saved_at,
                    "Loaded checkpoint"
                );
                StateTable::seeded(snapshot.entries)
            }
            Ok(None) => {
                info!(path = %path.display(), "No checkpoint file found, starting empty");
                StateTable::new()
            }
            Err(source) => return Err(CheckpointError::Load { path, source }),
        };

        let counters = Arc::new(FlushCounters::default());
        let worker = FlushWorker::new(path.clone(), policy, table.clone(), counters.clone());
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
        let shutdown = CancellationToken::new();
        let task = runtime.spawn(worker.run(rx, shutdown.clone()));

        Ok(Checkpoint {
            path,
            policy,
            table,
            tx,
            shutdown,
            worker: Mutex::new(Some(task)),
            counters,
        })
    }

    /// Returns the checkpoint file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the effective (clamped) flush policy.
    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }

    /// Hands a new position for `name` to the worker.
    ///
    /// Waits while a previous update is still waiting to be picked up. Once
    /// the checkpoint is closed, updates are dropped.
    pub async fn record(
        &self,
        name: impl Into<SourceName>,
        position: impl Into<Position>,
        observed_at: DateTime<Utc>,
    ) {
        let state = SourceState::new(name, position, observed_at);

        if let Err(mpsc::error::SendError(state)) = self.tx.send(state).await {
            debug!(
                source = %state.name,
                position = %state.position,
                "Checkpoint closed, dropping update"
            );
        }
    }

    /// Returns a copy of every tracked source's state.
    ///
    /// Reflects updates the worker has applied, whether or not they have been
    /// flushed yet. Never waits on the worker.
    pub fn current_state(&self) -> HashMap<SourceName, SourceState> {
        self.table.snapshot()
    }

    /// Returns a copy of one source's state.
    pub fn get(&self, name: &str) -> Option<SourceState> {
        self.table.get(name)
    }

    /// Returns the worker's flush counters.
    pub fn stats(&self) -> FlushStats {
        self.counters.load()
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stops the worker, waiting for its final flush.
    ///
    /// Safe to call any number of times from any number of tasks. Only the
    /// first call does any work; later or concurrent calls return once the
    /// worker has terminated.
    pub async fn close(&self) {
        let mut worker = self.worker.lock().await;
        let Some(task) = worker.take() else {
            return;
        };

        info!(path = %self.path.display(), "Closing checkpoint");
        self.shutdown.cancel();

        if let Err(e) = task.await {
            error!(error = %e, "Checkpoint worker task failed");
        }
    }
}

impl Drop for Checkpoint {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
