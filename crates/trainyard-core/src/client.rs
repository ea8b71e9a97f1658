//! Control-plane client.
//!
//! The control plane owns remote projects. This module provides the
//! [`ControlPlane`] seam used by the dispatcher and approval loop, and an
//! HTTP implementation backed by `reqwest`.

use crate::error::{CoreError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use trainyard_training::SubmissionPayload;

/// Opaque project identifier assigned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawProjectId")]
pub struct ProjectId(pub String);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProjectId {
    Number(i64),
    Text(String),
}

impl From<RawProjectId> for ProjectId {
    fn from(raw: RawProjectId) -> Self {
        match raw {
            RawProjectId::Number(n) => Self(n.to_string()),
            RawProjectId::Text(s) => Self(s),
        }
    }
}

/// Response to a project creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteJob {
    pub proj_name: String,
    pub id: ProjectId,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub status: i64,
}

#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn create_project(&self, payload: &SubmissionPayload) -> Result<RemoteJob>;

    async fn project_status(&self, project_id: &ProjectId) -> Result<ProjectStatus>;

    async fn start_processing(&self, project_id: &ProjectId) -> Result<serde_json::Value>;

    async fn start_training(&self, project_id: &ProjectId) -> Result<serde_json::Value>;
}

/// HTTP client for the control plane.
#[derive(Clone)]
pub struct ApiClient {
    /// Base URL, without trailing slash.
    base_url: String,
    token: String,
    client: Client,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    #[must_use]
    pub fn with_client(base_url: impl Into<String>, token: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, token: token.into(), client }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        self.send("GET", path, request).await
    }

    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<R> {
        let mut request = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send("POST", path, request).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<R> {
        debug!(method, path, "Control plane request");

        let response = request.bearer_auth(&self.token).send().await.map_err(|e| {
            error!(error = %e, base_url = %self.base_url, path, "Control plane unreachable");
            CoreError::remote(method, path, None, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, path, body = %body, "Control plane returned error status");
            return Err(CoreError::remote(method, path, Some(status.as_u16()), body));
        }

        response.json::<R>().await.map_err(|e| {
            CoreError::remote(method, path, Some(status.as_u16()), format!("invalid response body: {e}"))
        })
    }
}

#[async_trait]
impl ControlPlane for ApiClient {
    async fn create_project(&self, payload: &SubmissionPayload) -> Result<RemoteJob> {
        self.post_json("/projects/create", Some(payload)).await
    }

    async fn project_status(&self, project_id: &ProjectId) -> Result<ProjectStatus> {
        self.get_json(&format!("/projects/{project_id}")).await
    }

    async fn start_processing(&self, project_id: &ProjectId) -> Result<serde_json::Value> {
        self.post_json::<(), _>(&format!("/projects/{project_id}/data/start_processing"), None)
            .await
    }

    async fn start_training(&self, project_id: &ProjectId) -> Result<serde_json::Value> {
        self.post_json::<(), _>(&format!("/projects/{project_id}/start_training"), None).await
    }
}
