//! Repository hub client used to provision Spaces.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

/// Request to create a Space repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSpaceRequest {
    /// `namespace/name`
    pub repo_id: String,
    pub sdk: String,
    pub hardware: String,
    pub private: bool,
}

#[async_trait]
pub trait SpaceHub: Send + Sync {
    async fn create_space(&self, request: &CreateSpaceRequest) -> Result<()>;

    async fn add_space_secret(&self, repo_id: &str, key: &str, value: &str) -> Result<()>;

    async fn upload_file(&self, repo_id: &str, path_in_repo: &str, content: &[u8]) -> Result<()>;
}

/// HTTP client for the hub API.
#[derive(Clone)]
pub struct HubClient {
    base_url: String,
    token: String,
    client: Client,
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl HubClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, token: token.into(), client: Client::new() }
    }

    async fn post(&self, path: &str, request: reqwest::RequestBuilder) -> Result<()> {
        debug!(path, "Hub request");
        let response = request.bearer_auth(&self.token).send().await.map_err(|e| {
            error!(error = %e, base_url = %self.base_url, path, "Hub unreachable");
            CoreError::remote("POST", path, None, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, path, body = %body, "Hub returned error status");
            return Err(CoreError::remote("POST", path, Some(status.as_u16()), body));
        }
        Ok(())
    }
}

fn split_repo_id(repo_id: &str) -> (Option<&str>, &str) {
    match repo_id.split_once('/') {
        Some((namespace, name)) => (Some(namespace), name),
        None => (None, repo_id),
    }
}

#[async_trait]
impl SpaceHub for HubClient {
    async fn create_space(&self, request: &CreateSpaceRequest) -> Result<()> {
        let path = "/api/repos/create";
        let (organization, name) = split_repo_id(&request.repo_id);
        let body = json!({
            "type": "space",
            "name": name,
            "organization": organization,
            "private": request.private,
            "sdk": request.sdk,
            "hardware": request.hardware,
        });
        let builder = self.client.post(format!("{}{}", self.base_url, path)).json(&body);
        self.post(path, builder).await
    }

    async fn add_space_secret(&self, repo_id: &str, key: &str, value: &str) -> Result<()> {
        let path = format!("/api/spaces/{repo_id}/secrets");
        let builder = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&json!({ "key": key, "value": value }));
        self.post(&path, builder).await
    }

    async fn upload_file(&self, repo_id: &str, path_in_repo: &str, content: &[u8]) -> Result<()> {
        let path = format!("/api/spaces/{repo_id}/commit/main");
        // commit API: newline-delimited header + file operations
        let header = json!({
            "key": "header",
            "value": { "summary": format!("Upload {path_in_repo}"), "description": "" },
        });
        let file = json!({
            "key": "file",
            "value": { "path": path_in_repo, "encoding": "base64", "content": STANDARD.encode(content) },
        });
        let body = format!("{header}\n{file}\n");
        let builder = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        self.post(&path, builder).await
    }
}
