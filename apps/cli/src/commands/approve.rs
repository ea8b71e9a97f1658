//! `trainyard approve`: start processing, wait for it, then start training.

use super::api_client;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use trainyard_core::{
    ApiClient, Approver, NoopProgressSink, PollPolicy, ProgressSink, ProjectId, StdoutProgressSink,
    TrainyardConfig, MIN_POLL_INTERVAL,
};

pub async fn execute(
    config: &TrainyardConfig,
    project_id: &str,
    max_attempts: Option<u32>,
    timeout: Option<u64>,
    interval: Option<u64>,
    json_output: bool,
) -> Result<()> {
    let mut policy = config.poll_policy();
    if let Some(secs) = interval {
        policy.interval = Duration::from_secs(secs).max(MIN_POLL_INTERVAL);
    }
    if let Some(max) = max_attempts {
        policy = policy.with_max_attempts(max);
    }
    if let Some(secs) = timeout {
        policy = policy.with_timeout(Duration::from_secs(secs));
    }

    let progress: Arc<dyn ProgressSink> =
        if json_output { Arc::new(NoopProgressSink) } else { Arc::new(StdoutProgressSink) };
    run_approval(api_client(config)?, policy, &ProjectId::from(project_id), progress, json_output).await
}

/// Drive the approval of `project_id`, aborting cleanly on Ctrl-C.
pub async fn run_approval(
    client: Arc<ApiClient>,
    policy: PollPolicy,
    project_id: &ProjectId,
    progress: Arc<dyn ProgressSink>,
    json_output: bool,
) -> Result<()> {
    let approver = Approver::new(client, policy).with_progress(progress);

    let cancel = approver.cancellation_token();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let outcome = approver.approve(project_id).await;
    watcher.abort();
    let outcome = outcome?;

    if json_output {
        let out = json!({
            "project_id": outcome.project_id,
            "state": outcome.state,
            "polls": outcome.polls,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", "Project approved".bold().green());
    println!("  ID: {}", outcome.project_id.0.cyan());
    println!("  Status polls: {}", outcome.polls);
    println!();
    Ok(())
}
