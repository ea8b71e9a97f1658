//! `trainyard status`: report a project's status without changing it.

use super::api_client;
use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use trainyard_core::{project_state, ApprovalState, ProjectId, TrainyardConfig};

pub async fn execute(config: &TrainyardConfig, project_id: &str, json_output: bool) -> Result<()> {
    let client = api_client(config)?;
    let project_id = ProjectId::from(project_id);
    let (status, state) = project_state(client.as_ref(), &project_id).await?;

    if json_output {
        let out = json!({ "project_id": project_id, "status": status, "state": state });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let label = match state {
        ApprovalState::Ready => state.as_str().green(),
        _ => state.as_str().yellow(),
    };
    println!();
    println!("{}", format!("Project {}", project_id).bold().cyan());
    println!("  Status code: {}", status);
    println!("  State: {}", label);
    if state == ApprovalState::Ready {
        println!("  {}", format!("Run `trainyard approve {}` to start training.", project_id).dimmed());
    }
    println!();
    Ok(())
}
