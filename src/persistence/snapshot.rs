//! Snapshot persistence for tracked sources.
//!
//! A snapshot captures every tracked source's state at one instant. It is the
//! only thing ever written to the checkpoint file.
//!
//! # File Format
//!
//! Snapshots are YAML documents:
//!
//! ```text
//! savedAt: 2024-01-15T12:00:00Z
//! entries:
//!   - name: Application
//!     position: 10
//!     observedAt: 2024-01-15T11:59:58Z
//! ```
//!
//! Entries are always sorted by name so successive files diff cleanly.
//!
//! # Atomic Writes
//!
//! Snapshots are written using a write-to-temp-then-rename pattern:
//! 1. Write to `<path>.new`
//! 2. fsync the file
//! 3. Rename to `<path>`
//! 4. fsync the directory
//!
//! Readers always see either the old or new snapshot, never a partial write.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::fsync::{fsync_dir, fsync_file};
use crate::types::SourceState;

/// Suffix appended to the target path for the in-progress temp file.
pub const TEMP_SUFFIX: &str = ".new";

/// Errors that can occur during snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Persisted checkpoint snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// When this snapshot was written.
    #[serde(alias = "update_time")]
    pub saved_at: DateTime<Utc>,

    /// Source states, sorted by name.
    #[serde(default, alias = "event_logs")]
    pub entries: Vec<SourceState>,
}

impl Snapshot {
    /// Builds a snapshot from unordered states, sorting them by name.
    pub fn from_states(
        saved_at: DateTime<Utc>,
        states: impl IntoIterator<Item = SourceState>,
    ) -> Self {
        let mut entries: Vec<SourceState> = states.into_iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Snapshot { saved_at, entries }
    }

    /// Builds a snapshot stamped with the current time.
    pub fn now(states: impl IntoIterator<Item = SourceState>) -> Self {
        Self::from_states(Utc::now(), states)
    }
}

/// Returns the temp file path used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(TEMP_SUFFIX);
    PathBuf::from(tmp)
}

/// Saves a snapshot atomically to disk.
///
/// On failure the temp file is removed and any existing file at `path` is
/// left untouched.
///
/// # Errors
///
/// Returns an error if serialization or any IO operation fails.
pub fn save_snapshot_atomic(path: &Path, snapshot: &Snapshot) -> Result<()> {
    save_snapshot_with_rename(path, snapshot, |from, to| fs::rename(from, to))
}

/// Like [`save_snapshot_atomic`], with the final rename step supplied by the
/// caller.
pub(crate) fn save_snapshot_with_rename(
    path: &Path,
    snapshot: &Snapshot,
    rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> Result<()> {
    let yaml = serde_yaml::to_string(snapshot)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path);
    let result = write_and_rename(path, &tmp_path, yaml.as_bytes(), rename);

    if result.is_err()
        && let Err(e) = fs::remove_file(&tmp_path)
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp snapshot");
    }

    result
}

fn write_and_rename(
    path: &Path,
    tmp_path: &Path,
    bytes: &[u8],
    rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> Result<()> {
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp_path)?;
        file.write_all(bytes)?;
        fsync_file(&file)?;
    }

    rename(tmp_path, path)?;

    // fsync directory to ensure rename is durable
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fsync_dir(parent)?,
        _ => fsync_dir(Path::new("."))?,
    }

    Ok(())
}

/// Loads a snapshot from disk.
///
/// A file that is empty or whitespace-only loads as a snapshot with no
/// entries.
///
/// # Errors
///
/// Returns an error if the file can't be read or isn't a valid snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let contents = fs::read_to_string(path)?;

    if contents.trim().is_empty() {
        warn!(path = %path.display(), "Checkpoint file is empty, starting with no state");
        return Ok(Snapshot::now([]));
    }

    Ok(serde_yaml::from_str(&contents)?)
}

/// Attempts to load a snapshot, returning None if the file doesn't exist.
///
/// Other errors (unreadable file, malformed YAML) are propagated.
pub fn try_load_snapshot(path: &Path) -> Result<Option<Snapshot>> {
    match load_snapshot(path) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(SnapshotError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
