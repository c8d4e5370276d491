//! Persistence layer for source checkpoints.
//!
//! State is stored as a single YAML snapshot file. There is no log to
//! replay: each flush rewrites the whole file, and bootstrap simply loads it.
//!
//! # File Layout
//!
//! ```text
//! <path>        # last complete snapshot
//! <path>.new    # in-progress write (only present during or after a failed flush)
//! ```
//!
//! # Crash Safety
//!
//! - Snapshots are written to `<path>.new`, fsynced, then renamed over `<path>`
//! - The parent directory is fsynced so the rename survives power loss
//! - A stray `<path>.new` is never read and is overwritten by the next flush

pub mod fsync;
pub mod snapshot;

pub use fsync::{fsync_dir, fsync_file};
pub use snapshot::{
    Snapshot, SnapshotError, TEMP_SUFFIX, load_snapshot, save_snapshot_atomic, temp_path,
    try_load_snapshot,
};
