// Error types for job orchestration

use thiserror::Error;
use trainyard_training::TrainingError;

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Orchestration errors
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration, conflict and task errors raised by the training layer
    #[error(transparent)]
    Training(#[from] TrainingError),

    /// Transport or HTTP failure on a remote call
    #[error("remote call {method} {path} failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Remote {
        /// HTTP method
        method: &'static str,
        /// Request path, relative to the service base URL
        path: String,
        /// HTTP status, absent for transport failures
        status: Option<u16>,
        /// Response body or transport error
        message: String,
    },

    /// Approval polling exhausted its attempt or time budget
    #[error("project {project_id} was not ready after {attempts} status polls")]
    ApprovalTimeout {
        /// Project being approved
        project_id: String,
        /// Number of polls issued
        attempts: u32,
    },

    /// Approval cancelled by the caller
    #[error("approval of project {0} cancelled")]
    Cancelled(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether this error is a duplicate project or a busy workspace.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Training(e) if e.is_conflict())
    }

    pub(crate) fn remote(
        method: &'static str,
        path: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Remote { method, path: path.into(), status, message: message.into() }
    }
}
