//! Approval state machine.
//!
//! After a project is created remotely it must have its data processed before
//! training can start. The machine kicks off processing, polls the project
//! status until the control plane reports processing complete, then starts
//! training.

use crate::client::{ControlPlane, ProjectId};
use crate::error::{CoreError, Result};
use crate::progress::{NoopProgressSink, ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Remote status code meaning "data processing complete".
pub const DATA_PROCESSING_COMPLETE: i64 = 3;

/// Shortest interval accepted from user configuration.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Created,
    Processing,
    Ready,
    Approved,
}

impl ApprovalState {
    /// State implied by a polled status code, for a project whose processing
    /// has already been requested.
    #[must_use]
    pub fn from_status(status: i64) -> Self {
        if status == DATA_PROCESSING_COMPLETE {
            Self::Ready
        } else {
            Self::Processing
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Approved => "approved",
        }
    }
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long to keep polling for readiness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until ready
    pub max_attempts: Option<u32>,
    /// `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_secs(3))
    }
}

impl PollPolicy {
    #[must_use]
    pub fn unbounded(interval: Duration) -> Self {
        Self { interval, max_attempts: None, timeout: None }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    pub project_id: ProjectId,
    pub polls: u32,
    pub state: ApprovalState,
}

pub struct Approver {
    client: Arc<dyn ControlPlane>,
    policy: PollPolicy,
    cancel: CancellationToken,
    progress: Arc<dyn ProgressSink>,
}

impl Approver {
    #[must_use]
    pub fn new(client: Arc<dyn ControlPlane>, policy: PollPolicy) -> Self {
        Self {
            client,
            policy,
            cancel: CancellationToken::new(),
            progress: Arc::new(NoopProgressSink),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts an in-flight [`Approver::approve`].
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn transition(&self, project_id: &ProjectId, state: ApprovalState) {
        debug!(project_id = %project_id, state = %state, "Approval state");
        self.progress.on_event(ProgressEvent::ApprovalState { project_id: project_id.0.clone(), state });
    }

    /// Drive `project_id` from `Created` to `Approved`.
    pub async fn approve(&self, project_id: &ProjectId) -> Result<ApprovalOutcome> {
        self.transition(project_id, ApprovalState::Created);

        self.client.start_processing(project_id).await?;
        self.transition(project_id, ApprovalState::Processing);
        info!(project_id = %project_id, "Waiting for data processing to complete");

        let polls = self.wait_until_ready(project_id).await?;
        info!(project_id = %project_id, polls, "Data processing complete");
        self.transition(project_id, ApprovalState::Ready);

        info!(project_id = %project_id, "Approving project");
        self.client.start_training(project_id).await?;
        self.transition(project_id, ApprovalState::Approved);

        Ok(ApprovalOutcome { project_id: project_id.clone(), polls, state: ApprovalState::Approved })
    }

    async fn wait_until_ready(&self, project_id: &ProjectId) -> Result<u32> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(CoreError::Cancelled(project_id.0.clone()));
            }

            attempts += 1;
            let status = self.client.project_status(project_id).await?.status;
            self.progress.on_event(ProgressEvent::StatusPolled {
                project_id: project_id.0.clone(),
                attempt: attempts,
                status,
            });

            if ApprovalState::from_status(status) == ApprovalState::Ready {
                return Ok(attempts);
            }

            let out_of_attempts = self.policy.max_attempts.is_some_and(|max| attempts >= max);
            // an unrepresentable next wake-up is past any deadline
            let out_of_time = self.policy.timeout.is_some_and(|timeout| {
                started
                    .elapsed()
                    .checked_add(self.policy.interval)
                    .is_none_or(|next_poll| next_poll > timeout)
            });
            if out_of_attempts || out_of_time {
                return Err(CoreError::ApprovalTimeout { project_id: project_id.0.clone(), attempts });
            }

            tokio::select! {
                () = self.cancel.cancelled() => {
                    return Err(CoreError::Cancelled(project_id.0.clone()));
                }
                () = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }
}

/// Fetch the current status of a project without changing it.
pub async fn project_state(client: &dyn ControlPlane, project_id: &ProjectId) -> Result<(i64, ApprovalState)> {
    let status = client.project_status(project_id).await?.status;
    Ok((status, ApprovalState::from_status(status)))
}
