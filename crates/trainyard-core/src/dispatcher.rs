//! Backend dispatch.
//!
//! Decides where a normalized job runs: in a Space per record, on this
//! machine, or as a project on the remote control plane.

use crate::client::{ControlPlane, ProjectId};
use crate::error::Result;
use crate::local::{LocalRun, LocalRunner};
use crate::spaces::{SpaceHardware, SpacesProvisioner};
use std::sync::Arc;
use tracing::{info, warn};
use trainyard_training::{JobConfiguration, TrainingError};

/// Named execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Managed queue; not implemented yet.
    AutoTrain,
    /// Named local backend; not implemented yet (distinct from `--local`).
    Local,
    Spaces(SpaceHardware),
    /// Project on the control plane.
    Api,
}

impl Backend {
    /// Resolve a backend name. Names that are not reserved or a Spaces tier
    /// select the control-plane API.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "AutoTrain" => Self::AutoTrain,
            "Local" => Self::Local,
            other => SpaceHardware::from_backend_name(other).map_or(Self::Api, Self::Spaces),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoTrain => f.write_str("AutoTrain"),
            Self::Local => f.write_str("Local"),
            Self::Spaces(hw) => f.write_str(hw.backend_name()),
            Self::Api => f.write_str("api"),
        }
    }
}

/// Where a submitted job ended up.
#[derive(Debug)]
pub enum JobHandle {
    Remote(ProjectId),
    Spaces(Vec<String>),
    Local(LocalRun),
}

pub struct Dispatcher {
    control_plane: Arc<dyn ControlPlane>,
    spaces: SpacesProvisioner,
    local: LocalRunner,
}

impl Dispatcher {
    #[must_use]
    pub fn new(control_plane: Arc<dyn ControlPlane>, spaces: SpacesProvisioner, local: LocalRunner) -> Self {
        Self { control_plane, spaces, local }
    }

    pub async fn submit(&self, config: &JobConfiguration, backend: Backend, local: bool) -> Result<JobHandle> {
        info!(
            project = %config.project_name,
            task = %config.task,
            backend = %backend,
            local,
            "Submitting job"
        );

        match backend {
            Backend::AutoTrain | Backend::Local => {
                return Err(TrainingError::NotSupported(format!("the {backend} backend")).into());
            }
            _ => {}
        }

        if local {
            let payload = config.to_payload()?;
            let run = self.local.run_local(&payload, &config.token).await?;
            return Ok(JobHandle::Local(run));
        }

        if let Backend::Spaces(hardware) = backend {
            let repo_ids = self.spaces.provision(config, hardware).await?;
            return Ok(JobHandle::Spaces(repo_ids));
        }

        let payload = config.to_payload()?;
        info!(project = %payload.proj_name, task = payload.task, "Creating remote project");
        let job = self.control_plane.create_project(&payload).await?;
        if !job.created {
            warn!(project = %job.proj_name, "Project already exists");
            return Err(TrainingError::ProjectExists(job.proj_name).into());
        }

        info!(project = %job.proj_name, project_id = %job.id, "Project created");
        Ok(JobHandle::Remote(job.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("AutoTrain"), Backend::AutoTrain);
        assert_eq!(Backend::parse("Local"), Backend::Local);
        assert_eq!(Backend::parse("T4 Medium"), Backend::Spaces(SpaceHardware::T4Medium));
        assert_eq!(Backend::parse("api"), Backend::Api);
        assert_eq!(Backend::parse(""), Backend::Api);
    }
}
