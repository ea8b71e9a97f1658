//! Integration tests for backend dispatch.

mod common;

use common::{dataset, harness, record, HubCall};
use serde_json::json;
use tempfile::TempDir;
use trainyard_core::{Backend, CoreError, JobHandle, SpaceHardware};
use trainyard_training::{normalize, TrainingError, WorkspaceLayout};

#[tokio::test]
async fn test_second_submission_of_same_project_conflicts() {
    let temp = TempDir::new().unwrap();
    let h = harness(WorkspaceLayout::under(temp.path()));
    let config = normalize(&dataset("text_binary_classification"), "autotrain", None, &[]).unwrap();

    let first = h.dispatcher.submit(&config, Backend::Api, false).await.unwrap();
    assert!(matches!(first, JobHandle::Remote(ref id) if id.0 == "101"));

    let err = h.dispatcher.submit(&config, Backend::Api, false).await.unwrap_err();
    assert!(err.is_conflict());
    assert!(err.to_string().contains("demo"), "conflict should name the project: {err}");
    assert_eq!(h.control_plane.count("create"), 2);
}

#[tokio::test]
async fn test_unknown_backend_name_creates_remote_project() {
    let temp = TempDir::new().unwrap();
    let h = harness(WorkspaceLayout::under(temp.path()));
    let config = normalize(&dataset("text_binary_classification"), "autotrain", None, &[]).unwrap();

    let handle = h.dispatcher.submit(&config, Backend::parse("whatever"), false).await.unwrap();

    assert!(matches!(handle, JobHandle::Remote(_)));
    assert!(h.hub.calls().is_empty());
}

#[tokio::test]
async fn test_every_spaces_tier_provisions_one_space_per_record() {
    let params = vec![record(json!({"lr": 0.1})), record(json!({"lr": 0.01}))];

    for hardware in SpaceHardware::ALL {
        let temp = TempDir::new().unwrap();
        let h = harness(WorkspaceLayout::under(temp.path()));
        let config = normalize(
            &dataset("image_multi_class_classification"),
            "autotrain",
            Some("google/vit-base-patch16-224"),
            &params,
        )
        .unwrap();

        let handle = h
            .dispatcher
            .submit(&config, Backend::parse(hardware.backend_name()), false)
            .await
            .unwrap();

        let JobHandle::Spaces(repo_ids) = handle else {
            panic!("expected spaces handle for {hardware:?}");
        };
        assert_eq!(repo_ids, vec!["alice/autotrain-demo-0", "alice/autotrain-demo-1"]);

        let spaces = h.hub.created_spaces();
        assert_eq!(spaces.len(), 2);
        assert!(spaces.iter().all(|s| s.hardware == hardware.hardware_id() && s.private));
        assert_eq!(h.control_plane.count("create"), 0);
    }
}

#[tokio::test]
async fn test_spaces_receive_secrets_before_files() {
    let temp = TempDir::new().unwrap();
    let h = harness(WorkspaceLayout::under(temp.path()));
    let config = normalize(
        &dataset("text_binary_classification"),
        "autotrain",
        Some("bert-base-uncased"),
        &[record(json!({"epochs": 3}))],
    )
    .unwrap();

    h.dispatcher
        .submit(&config, Backend::Spaces(SpaceHardware::T4Small), false)
        .await
        .unwrap();

    let calls = h.hub.calls();
    assert_eq!(calls.len(), 1 + 6 + 2);
    assert!(matches!(calls[0], HubCall::CreateSpace(_)));
    let keys: Vec<_> = calls[1..7]
        .iter()
        .map(|c| match c {
            HubCall::Secret { key, .. } => key.as_str(),
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    assert_eq!(keys, ["HF_TOKEN", "AUTOTRAIN_USERNAME", "PROJECT_NAME", "PARAMS", "DATA_PATH", "TASK_ID"]);
    assert_eq!(
        calls[7],
        HubCall::Upload { repo_id: "alice/autotrain-demo-0".to_string(), path: "README.md".to_string() }
    );
    assert_eq!(
        calls[8],
        HubCall::Upload { repo_id: "alice/autotrain-demo-0".to_string(), path: "Dockerfile".to_string() }
    );
}

#[tokio::test]
async fn test_reserved_backends_are_not_supported() {
    let temp = TempDir::new().unwrap();
    let h = harness(WorkspaceLayout::under(temp.path()));
    let config = normalize(&dataset("text_binary_classification"), "autotrain", None, &[]).unwrap();

    for backend in [Backend::AutoTrain, Backend::Local] {
        for local in [false, true] {
            let err = h.dispatcher.submit(&config, backend, local).await.unwrap_err();
            assert!(
                matches!(err, CoreError::Training(TrainingError::NotSupported(_))),
                "unexpected error for {backend}: {err:?}"
            );
        }
    }

    assert!(h.control_plane.calls().is_empty());
    assert!(h.hub.calls().is_empty());
    assert_eq!(h.trainer.calls(), 0);
}

#[tokio::test]
async fn test_local_flag_runs_on_this_machine() {
    let temp = TempDir::new().unwrap();
    let layout = WorkspaceLayout::under(temp.path());
    let h = harness(layout.clone());
    let config = normalize(&dataset("text_binary_classification"), "autotrain", None, &[]).unwrap();

    let handle = h.dispatcher.submit(&config, Backend::Api, true).await.unwrap();

    let JobHandle::Local(run) = handle else {
        panic!("expected a local run");
    };
    assert_eq!(run.model_path, layout.model_dir("demo"));
    assert_eq!(h.trainer.calls(), 1);
    assert!(h.control_plane.calls().is_empty());
    assert!(!layout.lock_path().exists());
}

#[tokio::test]
async fn test_spaces_without_records_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let h = harness(WorkspaceLayout::under(temp.path()));
    let config = normalize(&dataset("text_binary_classification"), "autotrain", None, &[]).unwrap();

    let err = h
        .dispatcher
        .submit(&config, Backend::Spaces(SpaceHardware::A10gLarge), false)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Training(TrainingError::Configuration(_))), "unexpected error: {err:?}");
    assert!(h.hub.calls().is_empty());
    assert!(h.control_plane.calls().is_empty());
}
