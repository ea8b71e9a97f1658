//! Default local training entry points.
//!
//! Training itself happens in an external program. [`CommandTrainer`] hands
//! it the payload through a file in the model directory and a few
//! environment variables, then waits for it to exit.

use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tokio::process::Command;
use tracing::{info, warn};
use trainyard_training::{
    ResourceTracker, SubmissionPayload, TaskKind, Trainer, TrackerReport, TrainingError,
    TrainingResult, TrainingRun,
};

pub const PAYLOAD_FILE: &str = "payload.json";

/// Wall-clock tracker.
#[derive(Debug, Default)]
pub struct ElapsedTracker {
    started: Mutex<Option<Instant>>,
}

impl ElapsedTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceTracker for ElapsedTracker {
    fn start(&self) {
        if let Ok(mut started) = self.started.lock() {
            *started = Some(Instant::now());
        }
    }

    fn stop(&self) -> TrackerReport {
        let elapsed = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|s| s.elapsed())
            .unwrap_or_default();
        TrackerReport { elapsed, emissions_kg: None }
    }
}

/// Runs an external command for one task family.
#[derive(Debug, Clone)]
pub struct CommandTrainer {
    kind: TaskKind,
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTrainer {
    #[must_use]
    pub fn new(kind: TaskKind, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { kind, program: program.into(), args }
    }
}

#[async_trait]
impl Trainer for CommandTrainer {
    fn id(&self) -> &'static str {
        self.kind.as_str()
    }

    async fn train(
        &self,
        _tracker: &dyn ResourceTracker,
        payload: &SubmissionPayload,
        token: &str,
        model_path: &Path,
    ) -> TrainingResult<TrainingRun> {
        let payload_path = model_path.join(PAYLOAD_FILE);
        std::fs::write(&payload_path, serde_json::to_vec_pretty(payload)?)?;

        info!(
            program = %self.program.display(),
            task = %self.kind,
            model_path = %model_path.display(),
            "Launching local trainer"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .env("TRAINYARD_TASK", self.kind.as_str())
            .env("TRAINYARD_TASK_ID", payload.task.to_string())
            .env("TRAINYARD_PAYLOAD", &payload_path)
            .env("TRAINYARD_MODEL_PATH", model_path)
            .env("HF_TOKEN", token)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                TrainingError::Trainer(format!(
                    "failed to launch {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !status.success() {
            warn!(status = %status, task = %self.kind, "Local trainer failed");
            return Err(TrainingError::Trainer(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }

        Ok(TrainingRun {
            trainer: self.id().to_string(),
            model_path: model_path.to_path_buf(),
            finished_at: chrono::Utc::now(),
            metadata: json!({ "exit_code": status.code() }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use trainyard_training::PayloadConfig;

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            username: "alice".to_string(),
            proj_name: "p".to_string(),
            task: 9,
            config: PayloadConfig {
                advanced: true,
                autotrain: false,
                language: "unk".to_string(),
                max_models: Some(1),
                hub_model: Some("gpt2".to_string()),
                params: vec![],
            },
        }
    }

    #[test]
    fn test_elapsed_tracker_reports_zero_when_not_started() {
        let tracker = ElapsedTracker::new();
        assert_eq!(tracker.stop().elapsed, std::time::Duration::ZERO);
        tracker.start();
        assert!(tracker.stop().emissions_kg.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_trainer_writes_payload_and_checks_exit() {
        let temp = TempDir::new().unwrap();
        let tracker = ElapsedTracker::new();

        let ok = CommandTrainer::new(TaskKind::LanguageModelFineTune, "true", vec![]);
        let run = ok.train(&tracker, &payload(), "t", temp.path()).await.unwrap();
        assert_eq!(run.trainer, "language_model_fine_tune");
        let written: SubmissionPayload =
            serde_json::from_slice(&std::fs::read(temp.path().join(PAYLOAD_FILE)).unwrap()).unwrap();
        assert_eq!(written, payload());

        let failing = CommandTrainer::new(TaskKind::LanguageModelFineTune, "false", vec![]);
        let err = failing.train(&tracker, &payload(), "t", temp.path()).await.unwrap_err();
        assert!(matches!(err, TrainingError::Trainer(_)));
    }
}
