//! Integration tests for local execution behind the workspace lock.

mod common;

use common::{assert_configuration_error, dataset, local_runner, record, StubTrainer};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use trainyard_core::CoreError;
use trainyard_training::{normalize, SubmissionPayload, TaskKind, TrainingError, WorkspaceLayout};

fn payload(task: &str) -> SubmissionPayload {
    normalize(&dataset(task), "autotrain", None, &[record(json!({"epochs": 1}))])
        .unwrap()
        .to_payload()
        .unwrap()
}

#[tokio::test]
async fn test_busy_workspace_is_rejected_before_any_side_effect() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    std::fs::write(layout.lock_path(), "training").unwrap();
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), false));
    let runner = local_runner(layout.clone(), trainer.clone());

    let err = runner
        .run_local(&payload("text_binary_classification"), "hf_test_token")
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(matches!(err, CoreError::Training(TrainingError::WorkspaceBusy(_))));
    assert_eq!(trainer.calls(), 0);
    assert!(!layout.model_dir("demo").exists());
    // someone else's marker is left alone
    assert!(layout.lock_path().exists());
}

#[tokio::test]
async fn test_failing_trainer_releases_lock() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), true));
    let runner = local_runner(layout.clone(), trainer.clone());

    let err = runner
        .run_local(&payload("image_binary_classification"), "hf_test_token")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Training(TrainingError::Trainer(_))));
    assert_eq!(*trainer.lock_seen.lock().unwrap(), Some(true));
    assert!(!layout.lock_path().exists());
}

#[tokio::test]
async fn test_unsupported_task_releases_lock() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), false));
    let runner = local_runner(layout.clone(), trainer.clone());

    let err = runner
        .run_local(&payload("text_entity_extraction"), "hf_test_token")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Training(TrainingError::UnsupportedTask(4))));
    assert_eq!(trainer.calls(), 0);
    assert!(!layout.lock_path().exists());
    assert!(!layout.model_dir("demo").exists());
}

#[tokio::test]
async fn test_more_than_one_record_is_rejected() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), false));
    let runner = local_runner(layout.clone(), trainer.clone());
    let payload = normalize(
        &dataset("text_binary_classification"),
        "manual",
        Some("bert-base-uncased"),
        &[record(json!({"lr": 0.1})), record(json!({"lr": 0.2}))],
    )
    .unwrap()
    .to_payload()
    .unwrap();

    let err = runner.run_local(&payload, "hf_test_token").await.unwrap_err();

    assert_configuration_error(&err);
    assert_eq!(trainer.calls(), 0);
    assert!(!layout.lock_path().exists());
}

#[tokio::test]
async fn test_successful_run_holds_lock_only_while_training() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    let trainer = Arc::new(StubTrainer::new(layout.lock_path(), false));
    let runner = local_runner(layout.clone(), trainer.clone());

    let run = runner
        .run_local(&payload("dreambooth"), "hf_test_token")
        .await
        .unwrap();

    assert_eq!(run.task, TaskKind::SubjectImageGeneration);
    assert_eq!(run.model_path, layout.model_dir("demo"));
    assert!(run.model_path.is_dir());
    assert_eq!(*trainer.lock_seen.lock().unwrap(), Some(true));
    assert!(!layout.lock_path().exists());

    // the workspace is free again for the next job
    runner
        .run_local(&payload("lm_training"), "hf_test_token")
        .await
        .unwrap();
    assert_eq!(trainer.calls(), 2);
}
