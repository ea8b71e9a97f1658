//! Task registry.
//!
//! Maps the human-readable task names accepted by the control plane to their
//! numeric identifiers, and narrows the identifiers that can run locally into
//! [`TaskKind`].

use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};

/// Known tasks and their control-plane identifiers.
pub const TASKS: &[(&str, u32)] = &[
    ("text_binary_classification", 1),
    ("text_multi_class_classification", 2),
    ("text_entity_extraction", 4),
    ("text_extractive_question_answering", 5),
    ("text_summarization", 8),
    ("lm_training", 9),
    ("text_single_column_regression", 10),
    ("speech_recognition", 11),
    ("tabular_binary_classification", 13),
    ("tabular_multi_class_classification", 14),
    ("tabular_multi_label_classification", 15),
    ("tabular_single_column_regression", 16),
    ("image_binary_classification", 17),
    ("image_multi_class_classification", 18),
    ("natural_language_inference", 22),
    ("image_single_column_regression", 24),
    ("dreambooth", 25),
    ("tabular", 26),
];

/// Look up the numeric id of a task by name.
#[must_use]
pub fn task_id(name: &str) -> Option<u32> {
    TASKS.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

pub fn task_names() -> impl Iterator<Item = &'static str> {
    TASKS.iter().map(|(n, _)| *n)
}

pub fn resolve_task(name: &str) -> TrainingResult<u32> {
    task_id(name).ok_or_else(|| {
        TrainingError::Configuration(format!(
            "invalid task '{}'; choose one of: {}",
            name,
            task_names().collect::<Vec<_>>().join(", ")
        ))
    })
}

/// The families of training that can be executed on the local machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    TextClassification,
    ImageClassification,
    SubjectImageGeneration,
    LanguageModelFineTune,
}

impl TaskKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextClassification => "text_classification",
            Self::ImageClassification => "image_classification",
            Self::SubjectImageGeneration => "subject_image_generation",
            Self::LanguageModelFineTune => "language_model_fine_tune",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u32> for TaskKind {
    type Error = TrainingError;

    fn try_from(id: u32) -> TrainingResult<Self> {
        match id {
            1 | 2 => Ok(Self::TextClassification),
            17 | 18 => Ok(Self::ImageClassification),
            25 => Ok(Self::SubjectImageGeneration),
            9 => Ok(Self::LanguageModelFineTune),
            other => Err(TrainingError::UnsupportedTask(other)),
        }
    }
}
