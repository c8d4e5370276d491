//! fsync helpers used by the snapshot writer.
//!
//! A snapshot only counts as durable once both the temp file's contents and the
//! directory entry created by the rename have reached the disk. On POSIX
//! systems a rename is not guaranteed to survive power loss until the
//! containing directory has been synced as well. Other platforms cannot open
//! a directory as a file, so there the directory sync is a no-op and the
//! rename alone is relied upon.

use std::fs::File;
use std::io;
use std::path::Path;

/// Flushes a file's contents and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Flushes a directory's entries to disk.
///
/// Call this after creating or renaming a file inside `dir_path`.
///
/// # Errors
///
/// Returns an error if the directory cannot be opened or synced.
#[cfg(unix)]
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir = File::open(dir_path)?;
    dir.sync_all()
}

/// Flushes a directory's entries to disk.
///
/// Directories can't be opened for syncing here; this always succeeds.
#[cfg(not(unix))]
pub fn fsync_dir(_dir_path: &Path) -> io::Result<()> {
    Ok(())
}
