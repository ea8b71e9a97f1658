//! Workspace lock.
//!
//! A marker file guarantees at most one local training job per workspace. The
//! marker is created with `create_new`, so two processes racing on the same
//! path cannot both acquire it, and it is removed when the returned
//! [`LockGuard`] is dropped, whatever path the holder exits through.

use crate::error::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use trainyard_training::TrainingError;

const MARKER_CONTENTS: &[u8] = b"training";

#[derive(Debug, Clone)]
pub struct WorkspaceLock {
    path: PathBuf,
}

impl WorkspaceLock {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.path.exists()
    }

    /// Acquire the lock, failing with a conflict if the marker already exists.
    pub fn acquire(&self) -> Result<LockGuard> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(TrainingError::WorkspaceBusy(self.path.clone()).into());
            }
            Err(err) => return Err(err.into()),
        };

        let guard = LockGuard { path: self.path.clone(), released: false };
        // guard already owns the marker, so a failed write still cleans up
        file.write_all(MARKER_CONTENTS)?;
        debug!(path = %self.path.display(), "Workspace lock acquired");
        Ok(guard)
    }
}

/// Holds the workspace lock until dropped or released.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release explicitly, surfacing any removal error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        remove_marker(&self.path)?;
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_marker(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to release workspace lock on drop");
        }
    }
}

fn remove_marker(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Workspace lock released");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
