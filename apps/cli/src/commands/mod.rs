//! Command implementations for the Trainyard CLI.

pub mod approve;
pub mod create;
pub mod status;
pub mod tasks;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use trainyard_core::{ApiClient, TrainyardConfig};

/// Load an explicit config file, or discover the global and local ones.
pub fn load_config(path: Option<&Path>) -> Result<TrainyardConfig> {
    match path {
        Some(path) => {
            let mut config = TrainyardConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => TrainyardConfig::discover_and_load().context("Failed to load configuration"),
    }
}

pub fn require_token(config: &TrainyardConfig) -> Result<String> {
    config
        .token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .context("No access token configured. Set HF_TOKEN or `token` in ~/.trainyard/config.toml")
}

pub fn api_client(config: &TrainyardConfig) -> Result<Arc<ApiClient>> {
    Ok(Arc::new(ApiClient::new(&config.api_url, require_token(config)?)))
}
