//! Advisory flock(2) lock serialising audit log appends.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Held until dropped; closing the file releases the lock.
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Block until the lock at `path` is ours.
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("acquire lock {}", path.display()))?;
        Ok(Self { _file: file })
    }
}
