//! Trainyard CLI - submit and approve training jobs
//!
//! Provides the `trainyard` command for creating projects on the training
//! control plane, provisioning Spaces, running a job locally, and driving
//! the approval step.

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use trainyard_core::TrainyardConfig;

use commands::{approve, create, status, tasks};

/// Trainyard - training job orchestration
#[derive(Parser, Debug)]
#[command(
    name = "trainyard",
    author,
    version,
    about = "Trainyard - submit, provision and approve training jobs",
    long_about = "Trainyard submits training jobs to a remote control plane, to per-job Spaces, or to this machine.\nRemote projects are approved once their data has been processed."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Config file (skips ~/.trainyard/config.toml and ./.trainyardrc)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a training job
    ///
    /// Normalizes the job parameters and submits them to the selected backend.
    Create {
        /// Hub username that owns the dataset
        #[arg(short, long)]
        username: String,

        /// Project name
        #[arg(short, long)]
        project: String,

        /// Task name (see `trainyard tasks`)
        #[arg(short, long)]
        task: String,

        /// JSON array or JSON-lines file of job parameter records
        #[arg(long, value_name = "PATH")]
        params: Option<PathBuf>,

        /// Parameter mode (autotrain or manual)
        #[arg(long, default_value = "autotrain")]
        param_choice: String,

        /// Hub model to fine-tune instead of automatic model selection
        #[arg(long)]
        hub_model: Option<String>,

        /// Backend name: a Spaces tier such as "T4 Small", or anything else for the API
        #[arg(short, long, default_value = "api")]
        backend: String,

        /// Run the job on this machine
        #[arg(long)]
        local: bool,

        /// Approve the project once data processing completes
        #[arg(long)]
        approve: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a remote project
    ///
    /// Starts data processing, waits until it completes, then starts training.
    Approve {
        /// Project id
        project_id: String,

        /// Give up after this many status polls
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Seconds between status polls
        #[arg(long)]
        interval: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the status of a remote project
    Status {
        /// Project id
        project_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known tasks
    Tasks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let command = if let Some(cmd) = args.command {
        cmd
    } else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Tasks { json } => {
            init_tracing(args.log_level.as_deref())?;
            tasks::execute(json)?;
        }
        Command::Create {
            username,
            project,
            task,
            params,
            param_choice,
            hub_model,
            backend,
            local,
            approve,
            json,
        } => {
            let config = setup(args.log_level.as_deref(), args.config.as_deref())?;
            create::execute(
                &config,
                create::CreateArgs {
                    username,
                    project,
                    task,
                    params,
                    param_choice,
                    hub_model,
                    backend,
                    local,
                    approve,
                    json,
                },
            )
            .await?;
        }
        Command::Approve { project_id, max_attempts, timeout, interval, json } => {
            let config = setup(args.log_level.as_deref(), args.config.as_deref())?;
            approve::execute(&config, &project_id, max_attempts, timeout, interval, json).await?;
        }
        Command::Status { project_id, json } => {
            let config = setup(args.log_level.as_deref(), args.config.as_deref())?;
            status::execute(&config, &project_id, json).await?;
        }
    }

    Ok(())
}

/// Load configuration, then start logging at the CLI level or the configured one.
fn setup(log_level: Option<&str>, config_path: Option<&Path>) -> anyhow::Result<TrainyardConfig> {
    let config = commands::load_config(config_path)?;
    init_tracing(log_level.or(config.log_level.as_deref()))?;
    tracing::debug!(config = ?config, "Loaded configuration");
    Ok(config)
}

fn init_tracing(log_level: Option<&str>) -> anyhow::Result<()> {
    let level = match log_level.unwrap_or("info") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
