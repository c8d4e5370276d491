//! Source Checkpoint - crash-safe persistence of per-source read positions.
//!
//! Readers that consume several independent sources (event log channels,
//! files, partitions) report the last position they have fully handled for
//! each source. This crate keeps those positions in memory, batches them, and
//! writes them to a single YAML file so processing can resume after a restart
//! without skipping or repeating data.
//!
//! # Overview
//!
//! ```no_run
//! use std::time::Duration;
//! use chrono::Utc;
//! use source_checkpoint::Checkpoint;
//!
//! # async fn example() -> Result<(), source_checkpoint::CheckpointError> {
//! let checkpoint = Checkpoint::open(".checkpoint.yml", 10, Duration::from_secs(5))?;
//!
//! // Resume where we left off.
//! let start = checkpoint.get("Application").map(|s| s.position.0).unwrap_or(0);
//!
//! checkpoint.record("Application", start + 1, Utc::now()).await;
//!
//! checkpoint.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checkpoint`] - Public handle: open, record, read, close
//! - [`config`] - File path and flush thresholds, optionally from the environment
//! - [`worker`] - Background task that applies updates and schedules flushes
//! - [`persistence`] - Atomic snapshot writes and bootstrap loading
//! - [`state`] - Concurrency-safe in-memory state table
//! - [`types`] - Source names, positions and per-source state

pub mod checkpoint;
pub mod config;
pub mod persistence;
pub mod state;
pub mod types;
pub mod worker;

#[cfg(test)]
mod test_utils;

pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::CheckpointConfig;
pub use persistence::{Snapshot, SnapshotError};
pub use state::StateTable;
pub use types::{Position, SourceName, SourceState};
pub use worker::{FlushPolicy, FlushStats};
