//! Local execution guard.
//!
//! Runs a single job on this machine. The workspace lock is taken before any
//! other side effect and held by a guard for the whole trainer call.

use crate::config::TrainerConfig;
use crate::error::Result;
use crate::lock::WorkspaceLock;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::trainers::{CommandTrainer, ElapsedTracker};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use trainyard_training::{
    ResourceTracker, SubmissionPayload, TaskKind, Trainer, TrackerReport, TrainingError,
    TrainingRun, WorkspaceLayout,
};

/// One trainer per local task family.
#[derive(Clone)]
pub struct TrainerSet {
    text_classification: Arc<dyn Trainer>,
    image_classification: Arc<dyn Trainer>,
    subject_image_generation: Arc<dyn Trainer>,
    language_model: Arc<dyn Trainer>,
}

impl TrainerSet {
    #[must_use]
    pub fn new(
        text_classification: Arc<dyn Trainer>,
        image_classification: Arc<dyn Trainer>,
        subject_image_generation: Arc<dyn Trainer>,
        language_model: Arc<dyn Trainer>,
    ) -> Self {
        Self { text_classification, image_classification, subject_image_generation, language_model }
    }

    /// External-command trainers for every task family.
    #[must_use]
    pub fn from_config(config: &TrainerConfig) -> Self {
        let make = |kind: TaskKind| -> Arc<dyn Trainer> {
            Arc::new(CommandTrainer::new(kind, &config.program, config.args.clone()))
        };
        Self::new(
            make(TaskKind::TextClassification),
            make(TaskKind::ImageClassification),
            make(TaskKind::SubjectImageGeneration),
            make(TaskKind::LanguageModelFineTune),
        )
    }

    #[must_use]
    pub fn for_task(&self, kind: TaskKind) -> &dyn Trainer {
        match kind {
            TaskKind::TextClassification => self.text_classification.as_ref(),
            TaskKind::ImageClassification => self.image_classification.as_ref(),
            TaskKind::SubjectImageGeneration => self.subject_image_generation.as_ref(),
            TaskKind::LanguageModelFineTune => self.language_model.as_ref(),
        }
    }
}

/// Outcome of a successful local run.
#[derive(Debug, Clone)]
pub struct LocalRun {
    pub task: TaskKind,
    pub model_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub run: TrainingRun,
    pub report: TrackerReport,
}

pub struct LocalRunner {
    layout: WorkspaceLayout,
    trainers: TrainerSet,
    progress: Arc<dyn ProgressSink>,
}

impl LocalRunner {
    #[must_use]
    pub fn new(layout: WorkspaceLayout, trainers: TrainerSet, progress: Arc<dyn ProgressSink>) -> Self {
        Self { layout, trainers, progress }
    }

    #[must_use]
    pub fn lock(&self) -> WorkspaceLock {
        WorkspaceLock::new(self.layout.lock_path())
    }

    /// Run `payload` with the trainer selected by its task id.
    pub async fn run_local(&self, payload: &SubmissionPayload, token: &str) -> Result<LocalRun> {
        let guard = self.lock().acquire()?;

        if payload.config.params.len() > 1 {
            return Err(TrainingError::Configuration(
                "only one job parameter record is allowed in local mode".to_string(),
            )
            .into());
        }
        let task = TaskKind::try_from(payload.task)?;

        let model_path = self.layout.ensure_model_dir(&payload.proj_name)?;
        let tracker = ElapsedTracker::new();
        tracker.start();
        let started_at = Utc::now();

        info!(
            project = %payload.proj_name,
            task = %task,
            model_path = %model_path.display(),
            lock = %guard.path().display(),
            "Starting local training"
        );
        self.progress.on_event(ProgressEvent::LocalStarted { project: payload.proj_name.clone(), task });

        let result = self
            .trainers
            .for_task(task)
            .train(&tracker, payload, token, &model_path)
            .await;
        let report = tracker.stop();

        self.progress.on_event(ProgressEvent::LocalFinished {
            project: payload.proj_name.clone(),
            success: result.is_ok(),
        });

        let run = match result {
            Ok(run) => run,
            Err(e) => {
                error!(project = %payload.proj_name, error = %e, "Local training failed");
                return Err(e.into());
            }
        };

        guard.release()?;
        info!(project = %payload.proj_name, elapsed = ?report.elapsed, "Local training finished");

        Ok(LocalRun { task, model_path, started_at, run, report })
    }
}
