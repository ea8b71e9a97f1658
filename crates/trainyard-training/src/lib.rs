//! Trainyard Training
//!
//! Backend-agnostic primitives for:
//! - Resolving tasks and languages
//! - Normalizing job parameters into a `SubmissionPayload`
//! - Describing the local workspace layout
//! - Implementing local training entry points (`Trainer`)

pub mod error;
pub mod languages;
pub mod layout;
pub mod params;
pub mod payload;
pub mod tasks;
pub mod trainer;

pub use error::{TrainingError, TrainingResult};
pub use languages::{SUPPORTED_LANGUAGES, UNKNOWN_LANGUAGE};
pub use layout::WorkspaceLayout;
pub use params::{read_job_params, DatasetContext, JobParameterRecord};
pub use payload::{normalize, JobConfiguration, ParamChoice, PayloadConfig, SubmissionPayload};
pub use tasks::{resolve_task, task_id, TaskKind, TASKS};
pub use trainer::{ResourceTracker, Trainer, TrackerReport, TrainingRun};
