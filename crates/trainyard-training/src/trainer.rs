use crate::error::TrainingResult;
use crate::payload::SubmissionPayload;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Summary produced by a [`ResourceTracker`] when it is stopped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerReport {
    pub elapsed: Duration,
    /// Estimated emissions in kg CO2eq, when the tracker can measure them.
    pub emissions_kg: Option<f64>,
}

/// Measures resource usage for the duration of a local training run.
pub trait ResourceTracker: Send + Sync {
    fn start(&self);

    fn stop(&self) -> TrackerReport;
}

/// Metadata returned by a trainer entry point. Not inspected by the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRun {
    pub trainer: String,
    pub model_path: PathBuf,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    async fn train(
        &self,
        tracker: &dyn ResourceTracker,
        payload: &SubmissionPayload,
        token: &str,
        model_path: &Path,
    ) -> TrainingResult<TrainingRun>;
}
