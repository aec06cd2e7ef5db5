//! Effective configuration for one release invocation

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::context::RepoInfo;
use crate::error::Result;
use crate::providers::TextSource;

use super::defaults::{
    DEFAULT_RELEASE_NOTES, DEFAULT_RELEASE_TITLE, DEFAULT_TIMEOUT_MS, DEFAULT_TOKEN_REF,
};
use super::types::{AssetSpec, GiteaOptions};
use super::validation::validate_release_config;

/// Fully populated configuration snapshot
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Forge base URL as configured
    pub host: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Whether publishing is enabled
    pub release: bool,
    /// Release title source
    pub release_title: Option<TextSource>,
    /// Release notes source
    pub release_notes: Option<TextSource>,
    /// Mark as pre-release
    pub prerelease: bool,
    /// Create as draft
    pub draft: bool,
    /// Environment variable holding the API token
    pub token_ref: String,
    /// Request timeout in milliseconds
    pub timeout: u64,
    /// Assets to attach, in order
    pub assets: Vec<AssetSpec>,
}

impl ReleaseConfig {
    /// Apply defaults to raw options and validate the result.
    ///
    /// Each field comes from the explicit option first, then (for host, owner
    /// and repository) the host's repository metadata, then a fixed default.
    pub fn resolve(options: &GiteaOptions, repo: &RepoInfo) -> Result<Self> {
        let config = Self {
            host: pick(&options.host, &repo.host),
            owner: pick(&options.owner, &repo.owner),
            repository: pick(&options.repository, &repo.project),
            release: options.is_enabled(),
            release_title: Some(
                options
                    .release_title
                    .clone()
                    .unwrap_or_else(|| TextSource::from(DEFAULT_RELEASE_TITLE)),
            ),
            release_notes: Some(
                options
                    .release_notes
                    .clone()
                    .unwrap_or_else(|| TextSource::from(DEFAULT_RELEASE_NOTES)),
            ),
            prerelease: options.prerelease.unwrap_or(false),
            draft: options.draft.unwrap_or(false),
            token_ref: options
                .token_ref
                .clone()
                .unwrap_or_else(|| DEFAULT_TOKEN_REF.to_string()),
            timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT_MS),
            assets: options.assets.clone().unwrap_or_default(),
        };

        validate_release_config(&config)?;
        debug!(
            host = %config.host,
            owner = %config.owner,
            repository = %config.repository,
            assets = config.assets.len(),
            "resolved release configuration"
        );
        Ok(config)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// `/repos/{owner}/{repo}` prefix of every endpoint
    pub fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repository)
    }
}

fn pick(explicit: &Option<String>, fallback: &str) -> String {
    explicit
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
