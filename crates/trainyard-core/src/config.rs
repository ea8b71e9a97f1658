//! Configuration file support.
//!
//! Settings are read from a global `~/.trainyard/config.toml` and a local
//! `./.trainyardrc`; local tables are merged over global ones key by key, and
//! a few environment variables override the result.

use crate::approval::{PollPolicy, MIN_POLL_INTERVAL};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use trainyard_training::layout::{DEFAULT_LOCK_PATH, DEFAULT_MODEL_ROOT};
use trainyard_training::WorkspaceLayout;

pub const DEFAULT_API_URL: &str = "https://api.autotrain.huggingface.co";
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

pub const TOKEN_ENV: &str = "HF_TOKEN";
pub const API_URL_ENV: &str = "TRAINYARD_API_URL";
pub const HUB_URL_ENV: &str = "TRAINYARD_HUB_URL";

#[derive(Clone, Serialize, Deserialize)]
pub struct TrainyardConfig {
    /// Base URL of the training control plane
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the repository hub used for Spaces
    #[serde(default = "default_hub_url")]
    pub hub_url: String,

    /// Access token; `HF_TOKEN` takes precedence
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub approval: ApprovalConfig,

    #[serde(default)]
    pub trainer: TrainerConfig,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl std::fmt::Debug for TrainyardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainyardConfig")
            .field("api_url", &self.api_url)
            .field("hub_url", &self.hub_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("workspace", &self.workspace)
            .field("approval", &self.approval)
            .field("trainer", &self.trainer)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,
    #[serde(default = "default_model_root")]
    pub model_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Unset means poll until ready
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// External command used for local training runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    #[serde(default = "default_trainer_program")]
    pub program: String,
    #[serde(default = "default_trainer_args")]
    pub args: Vec<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_hub_url() -> String {
    DEFAULT_HUB_URL.to_string()
}

fn default_lock_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOCK_PATH)
}

fn default_model_root() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_ROOT)
}

fn default_poll_interval_secs() -> u64 {
    3
}

fn default_trainer_program() -> String {
    "autotrain".to_string()
}

fn default_trainer_args() -> Vec<String> {
    vec!["train".to_string()]
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self { lock_path: default_lock_path(), model_root: default_model_root() }
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self { poll_interval_secs: default_poll_interval_secs(), max_attempts: None, timeout_secs: None }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self { program: default_trainer_program(), args: default_trainer_args() }
    }
}

impl Default for TrainyardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            hub_url: default_hub_url(),
            token: None,
            workspace: WorkspaceConfig::default(),
            approval: ApprovalConfig::default(),
            trainer: TrainerConfig::default(),
            log_level: None,
        }
    }
}

impl TrainyardConfig {
    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".trainyard")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".trainyardrc")
    }

    /// Load configuration from a single TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let table = read_table(path)?;
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load and merge the given files in order, later files winning. Missing
    /// files are skipped.
    pub fn load_layered(paths: &[PathBuf]) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in paths {
            if !path.exists() {
                continue;
            }
            merge_tables(&mut merged, read_table(path)?);
        }
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Discover global and local config files and apply environment overrides.
    pub fn discover_and_load() -> Result<Self> {
        let mut config =
            Self::load_layered(&[Self::default_global_path(), Self::default_local_path()])?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides, reading through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
            self.api_url = url;
        }
        if let Some(url) = lookup(HUB_URL_ENV).filter(|u| !u.is_empty()) {
            self.hub_url = url;
        }
    }

    #[must_use]
    pub fn layout(&self) -> WorkspaceLayout {
        WorkspaceLayout::new(self.workspace.lock_path.clone(), self.workspace.model_root.clone())
    }

    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.approval.poll_interval_secs).max(MIN_POLL_INTERVAL),
            max_attempts: self.approval.max_attempts,
            timeout: self.approval.timeout_secs.map(Duration::from_secs),
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
    content
        .parse::<toml::Table>()
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
