//! Trainyard Core
//!
//! Concrete collaborators for submitting and observing training jobs:
//! - `ApiClient`: the remote control plane
//! - `SpacesProvisioner`: one hub Space per job record
//! - `LocalRunner`: single-job local execution behind a workspace lock
//! - `Approver`: the data-processing / approval state machine
//! - `Dispatcher`: picks one of the above for a normalized job

pub mod approval;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod local;
pub mod lock;
pub mod progress;
pub mod spaces;
pub mod trainers;

pub use approval::{
    project_state, ApprovalOutcome, ApprovalState, Approver, PollPolicy, MIN_POLL_INTERVAL,
};
pub use client::{ApiClient, ControlPlane, ProjectId, ProjectStatus, RemoteJob};
pub use config::TrainyardConfig;
pub use dispatcher::{Backend, Dispatcher, JobHandle};
pub use error::{CoreError, Result};
pub use hub::{CreateSpaceRequest, HubClient, SpaceHub};
pub use local::{LocalRun, LocalRunner, TrainerSet};
pub use lock::{LockGuard, WorkspaceLock};
pub use progress::{NoopProgressSink, ProgressEvent, ProgressSink, StdoutProgressSink};
pub use spaces::{ContainerJob, SpaceHardware, SpacesProvisioner};
pub use trainers::{CommandTrainer, ElapsedTracker};
