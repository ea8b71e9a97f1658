//! Spaces provisioning.
//!
//! One private Docker Space is created per job-parameter record. The Space
//! receives the job through secrets and boots the training API from a fixed
//! image. Provisioning does not wait for the Space to start.

use crate::error::Result;
use crate::hub::{CreateSpaceRequest, SpaceHub};
use crate::progress::{ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use trainyard_training::{JobConfiguration, TrainingError};

pub const SPACE_SDK: &str = "docker";
pub const BASE_IMAGE: &str = "huggingface/autotrain-advanced:latest";
pub const STARTUP_COMMAND: &str = "autotrain api --port 7860";
const DUPLICATED_FROM: &str = "autotrain-projects/autotrain-advanced";

/// Accelerator tiers available for Spaces jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceHardware {
    A10gLarge,
    A10gSmall,
    A100Large,
    T4Medium,
    T4Small,
}

impl SpaceHardware {
    pub const ALL: [SpaceHardware; 5] = [
        SpaceHardware::A10gLarge,
        SpaceHardware::A10gSmall,
        SpaceHardware::A100Large,
        SpaceHardware::T4Medium,
        SpaceHardware::T4Small,
    ];

    /// Resolve a user-facing backend name such as `"A10G Large"`.
    #[must_use]
    pub fn from_backend_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hw| hw.backend_name() == name)
    }

    #[must_use]
    pub fn backend_name(self) -> &'static str {
        match self {
            Self::A10gLarge => "A10G Large",
            Self::A10gSmall => "A10G Small",
            Self::A100Large => "A100 Large",
            Self::T4Medium => "T4 Medium",
            Self::T4Small => "T4 Small",
        }
    }

    /// Hardware flavour understood by the hub.
    #[must_use]
    pub fn hardware_id(self) -> &'static str {
        match self {
            Self::A10gLarge => "a10g-large",
            Self::A10gSmall => "a10g-small",
            Self::A100Large => "a100-large",
            Self::T4Medium => "t4-medium",
            Self::T4Small => "t4-small",
        }
    }
}

/// Everything needed to create one Space for one job record.
#[derive(Clone)]
pub struct ContainerJob {
    pub repo_id: String,
    pub hardware: SpaceHardware,
    pub secrets: Vec<(&'static str, String)>,
    pub readme: String,
    pub dockerfile: String,
}

impl std::fmt::Debug for ContainerJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<_> = self.secrets.iter().map(|(k, _)| *k).collect();
        f.debug_struct("ContainerJob")
            .field("repo_id", &self.repo_id)
            .field("hardware", &self.hardware)
            .field("secrets", &keys)
            .finish_non_exhaustive()
    }
}

#[must_use]
pub fn space_repo_id(username: &str, project_name: &str, index: usize) -> String {
    format!("{username}/autotrain-{project_name}-{index}")
}

/// Plan the Spaces for every record in `config`.
pub fn plan_container_jobs(
    config: &JobConfiguration,
    hardware: SpaceHardware,
) -> Result<Vec<ContainerJob>> {
    if config.params.is_empty() {
        return Err(TrainingError::Configuration(
            "Spaces need at least one job parameter record".to_string(),
        )
        .into());
    }
    let task_id = config.task_id()?;
    let data_path = config.data_path();

    config
        .params
        .iter()
        .enumerate()
        .map(|(index, record)| -> Result<ContainerJob> {
            let params = serde_json::to_string(record)?;
            Ok(ContainerJob {
                repo_id: space_repo_id(&config.username, &config.project_name, index),
                hardware,
                secrets: vec![
                    ("HF_TOKEN", config.token.clone()),
                    ("AUTOTRAIN_USERNAME", config.username.clone()),
                    ("PROJECT_NAME", config.project_name.clone()),
                    ("PARAMS", params),
                    ("DATA_PATH", data_path.clone()),
                    ("TASK_ID", task_id.to_string()),
                ],
                readme: space_readme(&config.project_name, index),
                dockerfile: format!("FROM {BASE_IMAGE}\nCMD {STARTUP_COMMAND}"),
            })
        })
        .collect()
}

fn space_readme(project_name: &str, index: usize) -> String {
    format!(
        "---\n\
         title: {project_name}-{index}\n\
         emoji: 🚀\n\
         colorFrom: green\n\
         colorTo: indigo\n\
         sdk: {SPACE_SDK}\n\
         pinned: false\n\
         duplicated_from: {DUPLICATED_FROM}\n\
         ---\n"
    )
}

/// Creates Spaces through a [`SpaceHub`].
pub struct SpacesProvisioner {
    hub: Arc<dyn SpaceHub>,
    progress: Arc<dyn ProgressSink>,
}

impl SpacesProvisioner {
    #[must_use]
    pub fn new(hub: Arc<dyn SpaceHub>, progress: Arc<dyn ProgressSink>) -> Self {
        Self { hub, progress }
    }

    /// Create one Space per record and return their repo ids in order.
    pub async fn provision(
        &self,
        config: &JobConfiguration,
        hardware: SpaceHardware,
    ) -> Result<Vec<String>> {
        let jobs = plan_container_jobs(config, hardware)?;
        let mut repo_ids = Vec::with_capacity(jobs.len());

        for job in jobs {
            info!(repo_id = %job.repo_id, hardware = hardware.hardware_id(), "Creating Space");
            self.hub
                .create_space(&CreateSpaceRequest {
                    repo_id: job.repo_id.clone(),
                    sdk: SPACE_SDK.to_string(),
                    hardware: hardware.hardware_id().to_string(),
                    private: true,
                })
                .await?;

            for (key, value) in &job.secrets {
                self.hub.add_space_secret(&job.repo_id, key, value).await?;
            }

            self.hub.upload_file(&job.repo_id, "README.md", job.readme.as_bytes()).await?;
            self.hub.upload_file(&job.repo_id, "Dockerfile", job.dockerfile.as_bytes()).await?;

            self.progress.on_event(ProgressEvent::SpaceCreated { repo_id: job.repo_id.clone() });
            repo_ids.push(job.repo_id);
        }

        Ok(repo_ids)
    }
}
