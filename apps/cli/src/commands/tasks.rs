//! `trainyard tasks`: list the task registry.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use trainyard_training::{TaskKind, TASKS};

pub fn execute(json_output: bool) -> Result<()> {
    if json_output {
        let out: Vec<_> = TASKS
            .iter()
            .map(|(name, id)| {
                json!({
                    "name": name,
                    "id": id,
                    "local": TaskKind::try_from(*id).ok(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Tasks ({})", TASKS.len()).bold().cyan());
    println!();
    println!("{:<40} {:<4} {}", "Name", "ID", "Local");
    println!("{}", "─".repeat(72));
    for (name, id) in TASKS {
        let local = TaskKind::try_from(*id).map_or_else(|_| "-".dimmed(), |kind| kind.as_str().green());
        println!("{:<40} {:<4} {}", name, id, local);
    }
    println!();
    Ok(())
}
