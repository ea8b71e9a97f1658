//! Job configuration normalization.
//!
//! Raw job parameters arrive as a table of loosely typed records. A handful of
//! keys configure the job as a whole rather than an individual run; they are
//! lifted out of the first record here and never reach the submission payload.

use crate::error::{TrainingError, TrainingResult};
use crate::languages::{self, UNKNOWN_LANGUAGE};
use crate::params::{DatasetContext, JobParameterRecord};
use crate::tasks::resolve_task;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

pub const SOURCE_LANGUAGE_KEY: &str = "source_language";
pub const TARGET_LANGUAGE_KEY: &str = "target_language";
pub const NUM_MODELS_KEY: &str = "num_models";

/// How hyperparameters were chosen for the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamChoice {
    /// The control plane searches hyperparameters itself.
    AutoTrain,
    /// Every record is an explicit run.
    Manual,
}

impl ParamChoice {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("autotrain") {
            Self::AutoTrain
        } else {
            Self::Manual
        }
    }
}

/// A validated, normalized job.
#[derive(Clone)]
pub struct JobConfiguration {
    pub username: String,
    pub project_name: String,
    pub task: String,
    pub token: String,
    pub param_choice: ParamChoice,
    pub language: String,
    pub max_models: Option<u64>,
    pub hub_model: Option<String>,
    pub params: Vec<JobParameterRecord>,
}

impl std::fmt::Debug for JobConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobConfiguration")
            .field("username", &self.username)
            .field("project_name", &self.project_name)
            .field("task", &self.task)
            .field("token", &"<redacted>")
            .field("param_choice", &self.param_choice)
            .field("language", &self.language)
            .field("max_models", &self.max_models)
            .field("hub_model", &self.hub_model)
            .field("params", &self.params)
            .finish()
    }
}

/// Canonical, backend-agnostic job submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub username: String,
    pub proj_name: String,
    pub task: u32,
    pub config: PayloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadConfig {
    pub advanced: bool,
    pub autotrain: bool,
    pub language: String,
    pub max_models: Option<u64>,
    pub hub_model: Option<String>,
    pub params: Vec<JobParameterRecord>,
}

/// Normalize raw job parameters into a [`JobConfiguration`].
///
/// `job_params` is left untouched; the returned configuration owns stripped
/// copies of the records.
pub fn normalize(
    dataset: &DatasetContext,
    param_choice: &str,
    hub_model: Option<&str>,
    job_params: &[JobParameterRecord],
) -> TrainingResult<JobConfiguration> {
    let param_choice = ParamChoice::parse(param_choice);
    let hub_model = hub_model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    info!(
        project = %dataset.project_name,
        task = %dataset.task,
        username = %dataset.username,
        param_choice = ?param_choice,
        hub_model = ?hub_model,
        num_records = job_params.len(),
        "Normalizing job configuration"
    );

    let token = dataset
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| TrainingError::config("no access token available; log in to the hub first"))?
        .to_string();

    if hub_model.is_some() && job_params.is_empty() {
        return Err(TrainingError::config(
            "job parameters are required when a hub model is specified",
        ));
    }
    if hub_model.is_none() && job_params.len() > 1 {
        return Err(TrainingError::config(
            "only one job parameter record is allowed in AutoTrain mode",
        ));
    }

    let mut params = job_params.to_vec();
    let (language, max_models) = match param_choice {
        ParamChoice::AutoTrain => lift_job_fields(params.first_mut())?,
        ParamChoice::Manual => (UNKNOWN_LANGUAGE.to_string(), Some(params.len() as u64)),
    };

    debug!(language = %language, max_models = ?max_models, "Job fields resolved");

    Ok(JobConfiguration {
        username: dataset.username.clone(),
        project_name: dataset.project_name.clone(),
        task: dataset.task.clone(),
        token,
        param_choice,
        language,
        max_models,
        hub_model,
        params,
    })
}

fn lift_job_fields(record: Option<&mut JobParameterRecord>) -> TrainingResult<(String, Option<u64>)> {
    let Some(record) = record else {
        return Ok((UNKNOWN_LANGUAGE.to_string(), None));
    };

    let source = record.remove(SOURCE_LANGUAGE_KEY).map(|v| value_text(&v));
    // target_language only counts alongside a source language
    let target = match source {
        Some(_) => record.remove(TARGET_LANGUAGE_KEY).map(|v| value_text(&v)),
        None => None,
    };

    let language = match (&source, target) {
        (Some(source), Some(target)) => format!("{target}2{source}"),
        (Some(source), None) => source.clone(),
        (None, _) => UNKNOWN_LANGUAGE.to_string(),
    };

    let max_models = match record.remove(NUM_MODELS_KEY) {
        Some(value) => Some(parse_model_count(&value)?),
        None if source.is_some() => {
            return Err(TrainingError::config(
                "num_models is required in job parameters when a language is specified",
            ));
        }
        None => None,
    };

    Ok((language, max_models))
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_model_count(value: &Value) -> TrainingResult<u64> {
    let count = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match count {
        Some(n) if n >= 1 => Ok(n),
        _ => Err(TrainingError::Configuration(format!(
            "num_models must be a positive integer, got {value}"
        ))),
    }
}

impl JobConfiguration {
    pub fn task_id(&self) -> TrainingResult<u32> {
        resolve_task(&self.task)
    }

    /// Language tag as submitted: canonicalized, and forced to `unk` when a
    /// hub model overrides model selection.
    #[must_use]
    pub fn submission_language(&self) -> String {
        if self.hub_model.is_some() {
            return UNKNOWN_LANGUAGE.to_string();
        }
        languages::canonicalize(&self.language)
    }

    #[must_use]
    pub fn data_path(&self) -> String {
        crate::params::data_path(&self.username, &self.project_name)
    }

    /// Build the submission payload, validating task and language.
    pub fn to_payload(&self) -> TrainingResult<SubmissionPayload> {
        let task = self.task_id()?;
        let language = self.submission_language();
        if !languages::is_supported(&language) {
            return Err(TrainingError::Configuration(format!(
                "invalid language '{language}'; check the supported languages"
            )));
        }

        Ok(SubmissionPayload {
            username: self.username.clone(),
            proj_name: self.project_name.clone(),
            task,
            config: PayloadConfig {
                advanced: true,
                autotrain: self.param_choice == ParamChoice::AutoTrain,
                language,
                max_models: self.max_models,
                hub_model: self.hub_model.clone(),
                params: self.params.clone(),
            },
        })
    }
}
