use crate::approval::ApprovalState;
use serde::{Deserialize, Serialize};
use trainyard_training::TaskKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    ApprovalState { project_id: String, state: ApprovalState },
    StatusPolled { project_id: String, attempt: u32, status: i64 },
    SpaceCreated { repo_id: String },
    LocalStarted { project: String, task: TaskKind },
    LocalFinished { project: String, success: bool },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ApprovalState { project_id, state } => {
                println!("[project:{project_id}] {state}");
            }
            ProgressEvent::StatusPolled { project_id, attempt, status } => {
                println!("[project:{project_id}] poll {attempt}: status {status}");
            }
            ProgressEvent::SpaceCreated { repo_id } => println!("[space:{repo_id}] created"),
            ProgressEvent::LocalStarted { project, task } => {
                println!("[local:{project}] started {task}");
            }
            ProgressEvent::LocalFinished { project, success } => {
                if success {
                    println!("[local:{project}] finished");
                } else {
                    println!("[local:{project}] failed");
                }
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
