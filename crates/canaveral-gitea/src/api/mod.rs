//! Gitea REST API client
//!
//! Only the release and attachment endpoints are covered:
//!
//! - `GET    /repos/{owner}/{repo}/releases/tags/{tag}`
//! - `POST   /repos/{owner}/{repo}/releases`
//! - `PATCH  /repos/{owner}/{repo}/releases/tags/{tag}`
//! - `POST   /repos/{owner}/{repo}/releases/{id}/assets`

#[cfg(test)]
pub(crate) mod mock;
mod transport;
mod types;

use std::path::Path;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::ReleaseConfig;
use crate::env::{resolve_token, EnvSource};
use crate::error::{ApiError, GiteaError, Result, UploadError};

pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, MultipartUpload, ReqwestTransport, RequestBody,
    TransportError, ATTACHMENT_FIELD, LABEL_FIELD, OCTET_STREAM,
};
pub use types::{AssetResponse, ReleasePayload, ReleaseResponse};

/// Path prefix of the REST API
pub const API_PREFIX: &str = "/api/v1";

/// Build a full API URL from a configured host and an endpoint.
///
/// A trailing slash on the host is dropped and `https://` is assumed when the
/// host carries no scheme.
pub fn build_api_url(host: &str, endpoint: &str) -> String {
    let host = host.trim_end_matches('/');
    let base = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    format!("{}{}{}", base, API_PREFIX, endpoint)
}

/// Client for one repository's releases
#[derive(Clone)]
pub struct GiteaClient {
    config: ReleaseConfig,
    transport: Arc<dyn HttpTransport>,
    env: Arc<dyn EnvSource>,
}

impl GiteaClient {
    /// Create a client for the repository named in `config`
    pub fn new(
        config: ReleaseConfig,
        transport: Arc<dyn HttpTransport>,
        env: Arc<dyn EnvSource>,
    ) -> Self {
        Self {
            config,
            transport,
            env,
        }
    }

    /// Configuration the client was built from
    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Full URL for an endpoint
    pub fn api_url(&self, endpoint: &str) -> String {
        build_api_url(&self.config.host, endpoint)
    }

    fn headers(&self, json: bool) -> Result<Vec<(String, String)>> {
        let token = resolve_token(self.env.as_ref(), &self.config.token_ref)?;
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if json {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.push(("Authorization".to_string(), format!("token {}", token)));
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse> {
        let url = self.api_url(endpoint);
        debug!("Gitea API request: {} {}", method, url);

        let request = HttpRequest {
            method,
            url,
            headers: self.headers(true)?,
            body: body.map(RequestBody::Json).unwrap_or(RequestBody::Empty),
            timeout: self.config.timeout(),
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }
        Ok(response)
    }

    /// Send a JSON request and decode the JSON response
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.send(method, endpoint, body).await?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()).into())
    }

    /// Whether a release exists for `tag`
    #[instrument(skip(self))]
    pub async fn release_exists(&self, tag: &str) -> Result<bool> {
        let endpoint = format!("{}/releases/tags/{}", self.config.repo_path(), tag);
        match self.send(Method::GET, &endpoint, None).await {
            Ok(_) => Ok(true),
            Err(GiteaError::Api(e)) if e.is_not_found() => {
                debug!(tag, "release not found");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a release
    #[instrument(skip(self, payload), fields(tag = %payload.tag_name))]
    pub async fn create_release(&self, payload: &ReleasePayload) -> Result<ReleaseResponse> {
        let endpoint = format!("{}/releases", self.config.repo_path());
        let body = serde_json::to_value(payload)?;
        self.request(Method::POST, &endpoint, Some(body)).await
    }

    /// Update the release for `tag`
    #[instrument(skip(self, payload))]
    pub async fn update_release(
        &self,
        tag: &str,
        payload: &ReleasePayload,
    ) -> Result<ReleaseResponse> {
        let endpoint = format!("{}/releases/tags/{}", self.config.repo_path(), tag);
        let body = serde_json::to_value(payload)?;
        self.request(Method::PATCH, &endpoint, Some(body)).await
    }

    /// Attach a file to a release
    #[instrument(skip(self, path, label), fields(path = %path.display()))]
    pub async fn upload_asset(
        &self,
        release_id: u64,
        path: &Path,
        name: &str,
        label: Option<&str>,
    ) -> Result<AssetResponse> {
        let url = self.api_url(&format!(
            "{}/releases/{}/assets",
            self.config.repo_path(),
            release_id
        ));
        debug!("Gitea asset upload: POST {}", url);

        let request = HttpRequest {
            method: Method::POST,
            url,
            headers: self.headers(false)?,
            body: RequestBody::Multipart(MultipartUpload {
                path: path.to_path_buf(),
                file_name: name.to_string(),
                label: label.map(str::to_string),
            }),
            timeout: self.config.timeout(),
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(UploadError::Status {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let asset: AssetResponse = serde_json::from_str(&response.body)
            .map_err(|e| UploadError::Decode(e.to_string()))?;
        info!(name, id = asset.id, "uploaded asset");
        Ok(asset)
    }
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient")
            .field("host", &self.config.host)
            .field("repository", &self.config.repo_path())
            .finish()
    }
}
