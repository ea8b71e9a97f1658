//! Shared stubs for Trainyard Core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trainyard_core::{
    ControlPlane, CoreError, CreateSpaceRequest, Dispatcher, LocalRunner, NoopProgressSink,
    ProjectId, ProjectStatus, RemoteJob, SpaceHub, SpacesProvisioner, TrainerSet,
};
use trainyard_training::{
    DatasetContext, JobParameterRecord, ResourceTracker, SubmissionPayload, Trainer,
    TrainingError, TrainingResult, TrainingRun, WorkspaceLayout,
};

pub fn dataset(task: &str) -> DatasetContext {
    DatasetContext {
        token: Some("hf_test_token".to_string()),
        username: "alice".to_string(),
        project_name: "demo".to_string(),
        task: task.to_string(),
    }
}

pub fn record(value: Value) -> JobParameterRecord {
    value.as_object().cloned().expect("record must be a JSON object")
}

/// Control plane that remembers project names and replays scripted statuses.
#[derive(Default)]
pub struct StubControlPlane {
    projects: Mutex<HashSet<String>>,
    statuses: Mutex<VecDeque<i64>>,
    pub calls: Mutex<Vec<String>>,
}

impl StubControlPlane {
    pub fn with_statuses(statuses: &[i64]) -> Self {
        Self { statuses: Mutex::new(statuses.iter().copied().collect()), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ControlPlane for StubControlPlane {
    async fn create_project(&self, payload: &SubmissionPayload) -> trainyard_core::Result<RemoteJob> {
        self.log("create");
        let created = self.projects.lock().unwrap().insert(payload.proj_name.clone());
        Ok(RemoteJob { proj_name: payload.proj_name.clone(), id: ProjectId::from("101"), created })
    }

    async fn project_status(&self, _project_id: &ProjectId) -> trainyard_core::Result<ProjectStatus> {
        self.log("status");
        // once the script runs out, keep reporting the last status
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(2)
        } else {
            statuses.front().copied().unwrap_or(2)
        };
        Ok(ProjectStatus { status })
    }

    async fn start_processing(&self, _project_id: &ProjectId) -> trainyard_core::Result<Value> {
        self.log("start_processing");
        Ok(json!({}))
    }

    async fn start_training(&self, _project_id: &ProjectId) -> trainyard_core::Result<Value> {
        self.log("start_training");
        Ok(json!({}))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubCall {
    CreateSpace(CreateSpaceRequest),
    Secret { repo_id: String, key: String },
    Upload { repo_id: String, path: String },
}

#[derive(Default)]
pub struct RecordingHub {
    pub calls: Mutex<Vec<HubCall>>,
}

impl RecordingHub {
    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_spaces(&self) -> Vec<CreateSpaceRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HubCall::CreateSpace(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SpaceHub for RecordingHub {
    async fn create_space(&self, request: &CreateSpaceRequest) -> trainyard_core::Result<()> {
        self.calls.lock().unwrap().push(HubCall::CreateSpace(request.clone()));
        Ok(())
    }

    async fn add_space_secret(&self, repo_id: &str, key: &str, _value: &str) -> trainyard_core::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HubCall::Secret { repo_id: repo_id.to_string(), key: key.to_string() });
        Ok(())
    }

    async fn upload_file(&self, repo_id: &str, path_in_repo: &str, _content: &[u8]) -> trainyard_core::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(HubCall::Upload { repo_id: repo_id.to_string(), path: path_in_repo.to_string() });
        Ok(())
    }
}

/// Trainer that counts calls, notes whether the lock was held, and can fail.
pub struct StubTrainer {
    pub calls: AtomicUsize,
    pub lock_seen: Mutex<Option<bool>>,
    lock_path: PathBuf,
    fail: bool,
}

impl StubTrainer {
    pub fn new(lock_path: &Path, fail: bool) -> Self {
        Self { calls: AtomicUsize::new(0), lock_seen: Mutex::new(None), lock_path: lock_path.to_path_buf(), fail }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Trainer for StubTrainer {
    fn id(&self) -> &'static str {
        "stub"
    }

    async fn train(
        &self,
        _tracker: &dyn ResourceTracker,
        _payload: &SubmissionPayload,
        _token: &str,
        model_path: &Path,
    ) -> TrainingResult<TrainingRun> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.lock_seen.lock().unwrap() = Some(self.lock_path.exists());
        if self.fail {
            return Err(TrainingError::Trainer("out of memory".to_string()));
        }
        Ok(TrainingRun {
            trainer: "stub".to_string(),
            model_path: model_path.to_path_buf(),
            finished_at: chrono::Utc::now(),
            metadata: json!({}),
        })
    }
}

pub fn uniform_trainers(trainer: Arc<StubTrainer>) -> TrainerSet {
    TrainerSet::new(trainer.clone(), trainer.clone(), trainer.clone(), trainer)
}

pub fn local_runner(layout: WorkspaceLayout, trainer: Arc<StubTrainer>) -> LocalRunner {
    LocalRunner::new(layout, uniform_trainers(trainer), Arc::new(NoopProgressSink))
}

pub struct Harness {
    pub control_plane: Arc<StubControlPlane>,
    pub hub: Arc<RecordingHub>,
    pub trainer: Arc<StubTrainer>,
    pub dispatcher: Dispatcher,
}

pub fn harness(layout: WorkspaceLayout) -> Harness {
    let control_plane = Arc::new(StubControlPlane::default());
    let hub = Arc::new(RecordingHub::default());
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), false));
    let dispatcher = Dispatcher::new(
        control_plane.clone(),
        SpacesProvisioner::new(hub.clone(), Arc::new(NoopProgressSink)),
        local_runner(layout, trainer.clone()),
    );
    Harness { control_plane, hub, trainer, dispatcher }
}

pub fn assert_configuration_error(err: &CoreError) {
    assert!(
        matches!(err, CoreError::Training(TrainingError::Configuration(_))),
        "expected configuration error, got {err:?}"
    );
}
