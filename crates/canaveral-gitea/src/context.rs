//! Host collaborator contract and the shared release context
//!
//! The release orchestrator that drives this plugin owns a per-run context
//! (version, changelog, repository metadata, ...) and a handful of services:
//! leveled logging, a dry-run flag and a context writer. [`ReleaseHost`]
//! captures exactly those operations so the publishing logic never depends on
//! a concrete orchestrator.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Context key written after a release has been created or updated
pub const RELEASE_URL_KEY: &str = "releaseUrl";

/// Repository metadata supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoInfo {
    /// Forge host name (e.g. "gitea.example.com")
    pub host: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Project name as derived from the remote
    pub project: String,
    /// Repository path ("owner/project")
    pub repository: String,
    /// Remote protocol ("https", "ssh")
    pub protocol: String,
    /// Remote name or URL
    pub remote: String,
}

impl RepoInfo {
    /// Derive repository metadata from a git remote URL.
    ///
    /// Supports `https://host/owner/repo(.git)`, `ssh://git@host:22/owner/repo`
    /// and the scp-like `git@host:owner/repo.git` form.
    pub fn from_remote_url(remote: &str) -> Option<Self> {
        let trimmed = remote.trim();

        let parsed = url::Url::parse(trimmed)
            .ok()
            .filter(|u| u.host_str().is_some());

        let (protocol, host, path) = if let Some(parsed) = parsed {
            let host = parsed.host_str().unwrap_or_default().to_string();
            let host = match parsed.port() {
                Some(port) if parsed.scheme() != "ssh" => format!("{}:{}", host, port),
                _ => host,
            };
            (parsed.scheme().to_string(), host, parsed.path().to_string())
        } else {
            // scp-like syntax: [user@]host:path
            let (authority, path) = trimmed.split_once(':')?;
            let host = authority.rsplit('@').next()?.to_string();
            ("ssh".to_string(), host, path.to_string())
        };

        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, project) = path.rsplit_once('/')?;
        if host.is_empty() || owner.is_empty() || project.is_empty() {
            return None;
        }

        Some(Self {
            host,
            owner: owner.to_string(),
            project: project.to_string(),
            repository: format!("{}/{}", owner, project),
            protocol,
            remote: trimmed.to_string(),
        })
    }
}

/// Per-run release context shared by every plugin of the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseContext {
    /// Version being released
    pub version: String,
    /// Previously released version
    pub latest_version: String,
    /// Changelog for this release
    pub changelog: String,
    /// Package name
    pub name: String,
    /// Branch the release is cut from
    pub branch_name: String,
    /// Git tag of this release
    pub tag_name: String,
    /// Repository metadata
    pub repo: RepoInfo,
    /// URL of the published release, once known
    pub release_url: Option<String>,
    /// Values written by other plugins
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl ReleaseContext {
    /// Read a single context field by key (dotted paths for `repo.*`)
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "version" => &self.version,
            "latestVersion" => &self.latest_version,
            "changelog" => &self.changelog,
            "name" => &self.name,
            "branchName" => &self.branch_name,
            "tagName" => &self.tag_name,
            "repo.host" => &self.repo.host,
            "repo.owner" => &self.repo.owner,
            "repo.project" => &self.repo.project,
            "repo.repository" => &self.repo.repository,
            "repo.protocol" => &self.repo.protocol,
            "repo.remote" => &self.repo.remote,
            RELEASE_URL_KEY => return self.release_url.as_deref(),
            other => return self.extra.get(other).map(String::as_str),
        };
        Some(value.as_str())
    }

    /// Write a single context field by key
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "version" => self.version = value,
            "latestVersion" => self.latest_version = value,
            "changelog" => self.changelog = value,
            "name" => self.name = value,
            "branchName" => self.branch_name = value,
            "tagName" => self.tag_name = value,
            RELEASE_URL_KEY => self.release_url = Some(value),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }
}

/// Log severity understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Failures
    Error,
    /// Recoverable problems
    Warn,
    /// State transitions and outcomes
    Info,
    /// Diagnostic detail
    Verbose,
}

impl LogLevel {
    /// Get level as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "verbose",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations the release orchestrator provides to the plugin
pub trait ReleaseHost: Send + Sync {
    /// Snapshot of the current release context
    fn context(&self) -> ReleaseContext;

    /// Write one value into the shared context
    fn set_context(&self, key: &str, value: &str);

    /// Whether side effects should be replaced by descriptive logging
    fn is_dry_run(&self) -> bool {
        false
    }

    /// Emit a user-facing log line
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Verbose => tracing::debug!("{}", message),
        }
    }
}

/// Host implementation backed by an in-process context.
///
/// Log lines are forwarded to `tracing` and also recorded so callers can
/// inspect what was reported.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    context: Mutex<ReleaseContext>,
    dry_run: bool,
    logs: Mutex<Vec<(LogLevel, String)>>,
}

impl InMemoryHost {
    /// Create a host around an initial context
    pub fn new(context: ReleaseContext) -> Self {
        Self {
            context: Mutex::new(context),
            dry_run: false,
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Set the dry-run flag
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replace the repository metadata
    pub fn set_repo(&self, repo: RepoInfo) {
        let mut context = self.context.lock().unwrap_or_else(|e| e.into_inner());
        context.repo = repo;
    }

    /// All recorded log lines in emission order
    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded messages at one level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl ReleaseHost for InMemoryHost {
    fn context(&self) -> ReleaseContext {
        self.context.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_context(&self, key: &str, value: &str) {
        let mut context = self.context.lock().unwrap_or_else(|e| e.into_inner());
        context.set(key, value);
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Verbose => tracing::debug!("{}", message),
        }
        self.logs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}
