//! `trainyard create`: normalize job parameters and submit them.

use super::approve::run_approval;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use trainyard_core::{
    ApiClient, Backend, Dispatcher, HubClient, JobHandle, LocalRunner, NoopProgressSink, ProgressSink,
    SpacesProvisioner, StdoutProgressSink, TrainerSet, TrainyardConfig,
};
use trainyard_training::{normalize, read_job_params, DatasetContext};

#[derive(Debug)]
pub struct CreateArgs {
    pub username: String,
    pub project: String,
    pub task: String,
    pub params: Option<PathBuf>,
    pub param_choice: String,
    pub hub_model: Option<String>,
    pub backend: String,
    pub local: bool,
    pub approve: bool,
    pub json: bool,
}

pub async fn execute(config: &TrainyardConfig, args: CreateArgs) -> Result<()> {
    let job_params = match &args.params {
        Some(path) => read_job_params(path)
            .with_context(|| format!("Failed to read job parameters from {}", path.display()))?,
        None => Vec::new(),
    };

    let dataset = DatasetContext {
        token: config.token.clone(),
        username: args.username.clone(),
        project_name: args.project.clone(),
        task: args.task.clone(),
    };
    let job = normalize(&dataset, &args.param_choice, args.hub_model.as_deref(), &job_params)?;

    let progress: Arc<dyn ProgressSink> =
        if args.json { Arc::new(NoopProgressSink) } else { Arc::new(StdoutProgressSink) };
    let control_plane = Arc::new(ApiClient::new(&config.api_url, &job.token));
    let dispatcher = Dispatcher::new(
        control_plane.clone(),
        SpacesProvisioner::new(Arc::new(HubClient::new(&config.hub_url, &job.token)), progress.clone()),
        LocalRunner::new(config.layout(), TrainerSet::from_config(&config.trainer), progress.clone()),
    );

    let backend = Backend::parse(&args.backend);
    // dropping the submission on Ctrl-C releases the workspace lock and kills the trainer
    let handle = tokio::select! {
        handle = dispatcher.submit(&job, backend, args.local) => handle?,
        _ = tokio::signal::ctrl_c() => {
            anyhow::bail!("Interrupted; submission of {} abandoned", job.project_name);
        }
    };

    match handle {
        JobHandle::Remote(project_id) => {
            if args.json && !args.approve {
                println!("{}", serde_json::to_string_pretty(&json!({ "project_id": project_id }))?);
                return Ok(());
            }
            if !args.json {
                println!();
                println!("{}", "Project created".bold().green());
                println!("  Project: {}", job.project_name.cyan());
                println!("  ID: {}", project_id.0.cyan());
                println!();
            }
            if args.approve {
                run_approval(control_plane, config.poll_policy(), &project_id, progress, args.json).await?;
            } else if !args.json {
                println!(
                    "  {}",
                    format!("Next: run `trainyard approve {}` once you are ready to train.", project_id).dimmed()
                );
                println!();
            }
        }
        JobHandle::Spaces(repo_ids) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "spaces": repo_ids }))?);
                return Ok(());
            }
            println!();
            println!("{}", format!("Spaces created ({})", repo_ids.len()).bold().green());
            for repo_id in &repo_ids {
                println!("  {}", repo_id.cyan());
            }
            println!();
        }
        JobHandle::Local(run) => {
            if args.json {
                let out = json!({
                    "task": run.task,
                    "model_path": run.model_path,
                    "started_at": run.started_at,
                    "finished_at": run.run.finished_at,
                    "elapsed_secs": run.report.elapsed.as_secs_f64(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }
            println!();
            println!("{}", "Local training complete".bold().green());
            println!("  Task: {}", run.task.to_string().cyan());
            println!("  Model: {}", run.model_path.display().to_string().dimmed());
            println!("  Elapsed: {:.1}s", run.report.elapsed.as_secs_f64());
            println!();
        }
    }

    Ok(())
}
