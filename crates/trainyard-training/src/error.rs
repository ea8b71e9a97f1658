use std::path::PathBuf;
use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid job configuration: {0}")]
    Configuration(String),

    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("project with name {0} already exists")]
    ProjectExists(String),

    #[error("another training job is already running in this workspace (lock: {})", .0.display())]
    WorkspaceBusy(PathBuf),

    #[error("unsupported task id {0} for local training")]
    UnsupportedTask(u32),

    #[error("trainer error: {0}")]
    Trainer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrainingError {
    /// True for both flavours of conflict: duplicate remote project and busy workspace.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ProjectExists(_) | Self::WorkspaceBusy(_))
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
