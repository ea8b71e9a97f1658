use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of hyperparameters for a single training run.
pub type JobParameterRecord = serde_json::Map<String, serde_json::Value>;

/// Identity and project metadata supplied by the dataset that backs a job.
#[derive(Clone, Serialize, Deserialize)]
pub struct DatasetContext {
    #[serde(default)]
    pub token: Option<String>,
    pub username: String,
    pub project_name: String,
    pub task: String,
}

impl DatasetContext {
    /// Hub path where the processed dataset for this project lives.
    #[must_use]
    pub fn data_path(&self) -> String {
        data_path(&self.username, &self.project_name)
    }
}

impl std::fmt::Debug for DatasetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("project_name", &self.project_name)
            .field("task", &self.task)
            .finish()
    }
}

#[must_use]
pub fn data_path(username: &str, project_name: &str) -> String {
    format!("{username}/autotrain-data-{project_name}")
}

/// Read a job-parameter table.
///
/// Accepts either a JSON array of objects or JSONL with one object per line.
pub fn read_job_params(path: &Path) -> TrainingResult<Vec<JobParameterRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let trimmed = contents.trim_start();

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| {
            TrainingError::Configuration(format!(
                "failed to parse job parameters in {}: {}",
                path.display(),
                e
            ))
        });
    }

    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: JobParameterRecord = serde_json::from_str(line).map_err(|e| {
            TrainingError::Configuration(format!("failed to parse jsonl line {}: {}", idx + 1, e))
        })?;
        records.push(record);
    }

    Ok(records)
}
