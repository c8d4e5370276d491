//! Checkpoint configuration.
//!
//! Configuration is a file path plus a [`FlushPolicy`]. It can be built in
//! code or read from the environment:
//!
//! - `CHECKPOINT_FILE`: checkpoint file path (default `.checkpoint.yml`)
//! - `CHECKPOINT_MAX_UPDATES`: updates per flush (default 10, minimum 1)
//! - `CHECKPOINT_FLUSH_INTERVAL_SECS`: seconds between flushes (default 5, minimum 1)

use std::path::PathBuf;
use std::time::Duration;

use crate::worker::FlushPolicy;

/// Environment variable naming the checkpoint file.
pub const CHECKPOINT_FILE_ENV: &str = "CHECKPOINT_FILE";

/// Checkpoint file used when none is configured.
pub const DEFAULT_CHECKPOINT_FILE: &str = ".checkpoint.yml";

/// Configuration for opening a [`Checkpoint`](crate::Checkpoint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointConfig {
    /// File where state is persisted.
    pub path: PathBuf,

    /// When to flush state to `path`.
    pub policy: FlushPolicy,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKPOINT_FILE)
    }
}

impl CheckpointConfig {
    /// Creates a configuration for `path` with the default flush policy.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CheckpointConfig {
            path: path.into(),
            policy: FlushPolicy::default(),
        }
    }

    /// Sets the flush policy.
    pub fn with_policy(mut self, policy: FlushPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets both flush thresholds. Values below the floors are clamped.
    pub fn with_thresholds(self, max_updates: usize, flush_interval: Duration) -> Self {
        self.with_policy(FlushPolicy::new(max_updates, flush_interval))
    }

    /// Creates a `CheckpointConfig` from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = lookup(CHECKPOINT_FILE_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHECKPOINT_FILE.to_string());

        CheckpointConfig {
            path: PathBuf::from(path),
            policy: FlushPolicy::from_lookup(lookup),
        }
    }
}
