use crate::error::TrainingResult;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOCK_PATH: &str = "/tmp/training";
pub const DEFAULT_MODEL_ROOT: &str = "/tmp/model";

/// Filesystem layout for local training inside a workspace.
///
/// Default layout is a lock marker at `/tmp/training` and model outputs under
/// `/tmp/model/<project_name>`.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    lock_path: PathBuf,
    model_root: PathBuf,
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_LOCK_PATH), PathBuf::from(DEFAULT_MODEL_ROOT))
    }
}

impl WorkspaceLayout {
    #[must_use]
    pub fn new(lock_path: PathBuf, model_root: PathBuf) -> Self {
        Self { lock_path, model_root }
    }

    /// Layout rooted in an arbitrary directory, mostly useful for tests.
    #[must_use]
    pub fn under(root: &Path) -> Self {
        Self::new(root.join("training"), root.join("model"))
    }

    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    #[must_use]
    pub fn model_root(&self) -> &Path {
        &self.model_root
    }

    #[must_use]
    pub fn model_dir(&self, project_name: &str) -> PathBuf {
        self.model_root.join(project_name)
    }

    pub fn ensure_model_dir(&self, project_name: &str) -> TrainingResult<PathBuf> {
        let dir = self.model_dir(project_name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::under(temp.path());

        assert!(layout.lock_path().ends_with("training"));
        let dir = layout.ensure_model_dir("proj").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, temp.path().join("model").join("proj"));
    }

    #[test]
    fn test_default_layout_uses_tmp() {
        let layout = WorkspaceLayout::default();
        assert_eq!(layout.lock_path(), Path::new("/tmp/training"));
        assert_eq!(layout.model_dir("p"), PathBuf::from("/tmp/model/p"));
    }
}
