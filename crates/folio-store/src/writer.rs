//! Serialized, atomic file writes
//!
//! Writers to the same path queue on a per-path mutex held across the whole
//! read-merge-write. Bytes land in a sibling temp file that is renamed over
//! the target, so readers see either the old or the new file.

use crate::error::{StoreError, StoreResult};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-path write locks
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    /// Empty lock table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }

    /// Drop the entry for `path` if nobody is waiting on it
    pub fn release(&self, path: &Path) {
        self.locks
            .remove_if(path, |_, mutex| Arc::strong_count(mutex) == 1);
    }

    /// Number of tracked paths
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no path is tracked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Write `contents` to `path` through a temp file and rename
///
/// Parent directories are created as needed. On failure the temp file is
/// removed and the target is left untouched.
///
/// # Errors
/// Returns [`StoreError::Io`] if any step fails.
pub async fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Invalid(format!("{} has no parent", path.display())))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| StoreError::Invalid(format!("{} has no file name", path.display())))?;

    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| StoreError::io_error(parent, e))?;

    let tmp = parent.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()));
    if let Err(e) = write_synced(&tmp, contents).await {
        discard(&tmp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        discard(&tmp).await;
        return Err(StoreError::io_error(path, e));
    }
    tracing::debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

async fn write_synced(tmp: &Path, contents: &str) -> StoreResult<()> {
    let mut file = tokio::fs::File::create(tmp)
        .await
        .map_err(|e| StoreError::io_error(tmp, e))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| StoreError::io_error(tmp, e))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::io_error(tmp, e))
}

async fn discard(tmp: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp).await {
        tracing::warn!(path = %tmp.display(), error = %e, "failed to remove temp file");
    }
}
