//! Configuration types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::providers::TextSource;

/// Raw plugin options as supplied by the host configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GiteaOptions {
    /// Forge base URL (falls back to `repo.host`)
    pub host: Option<String>,

    /// Repository owner (falls back to `repo.owner`)
    pub owner: Option<String>,

    /// Repository name (falls back to `repo.project`)
    pub repository: Option<String>,

    /// Release switch; only an explicit `false` disables publishing
    pub release: Option<Value>,

    /// Release title source
    pub release_title: Option<TextSource>,

    /// Release notes source
    pub release_notes: Option<TextSource>,

    /// Mark the release as a pre-release
    pub prerelease: Option<bool>,

    /// Create the release as a draft
    pub draft: Option<bool>,

    /// Name of the environment variable holding the API token
    pub token_ref: Option<String>,

    /// Request timeout in milliseconds
    pub timeout: Option<u64>,

    /// Assets to attach
    pub assets: Option<Vec<AssetSpec>>,
}

impl GiteaOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether publishing is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self.release, Some(Value::Bool(false)))
    }

    /// Set the forge host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the repository owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the repository name
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Enable or disable publishing
    pub fn with_release(mut self, release: bool) -> Self {
        self.release = Some(Value::Bool(release));
        self
    }

    /// Set the title source
    pub fn with_release_title(mut self, title: impl Into<TextSource>) -> Self {
        self.release_title = Some(title.into());
        self
    }

    /// Set the notes source
    pub fn with_release_notes(mut self, notes: impl Into<TextSource>) -> Self {
        self.release_notes = Some(notes.into());
        self
    }

    /// Set the token variable name
    pub fn with_token_ref(mut self, token_ref: impl Into<String>) -> Self {
        self.token_ref = Some(token_ref.into());
        self
    }

    /// Set the assets
    pub fn with_assets(mut self, assets: Vec<AssetSpec>) -> Self {
        self.assets = Some(assets);
        self
    }
}

/// How matched files are attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Upload every matched file individually
    #[default]
    File,
    /// Bundle all matched files into one zip archive
    Zip,
}

impl AssetType {
    /// Get type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Zip => "zip",
        }
    }
}

/// Fully specified asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Glob pattern selecting files
    pub path: String,

    /// Uploaded file name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Attachment mode
    #[serde(default, rename = "type")]
    pub asset_type: AssetType,

    /// Label sent along with the upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AssetConfig {
    /// Create a file asset for `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            asset_type: AssetType::File,
            label: None,
        }
    }

    /// Bundle matches into a zip archive
    pub fn zip(mut self) -> Self {
        self.asset_type = AssetType::Zip;
        self
    }

    /// Set the uploaded name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Asset entry as written in configuration: a bare path or a full object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetSpec {
    /// Shorthand for a file asset
    Path(String),
    /// Full asset configuration
    Config(AssetConfig),
}

impl AssetSpec {
    /// Expand shorthand into a full configuration
    pub fn normalize(&self) -> AssetConfig {
        match self {
            Self::Path(path) => AssetConfig::new(path.clone()),
            Self::Config(config) => config.clone(),
        }
    }
}

impl From<&str> for AssetSpec {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<AssetConfig> for AssetSpec {
    fn from(config: AssetConfig) -> Self {
        Self::Config(config)
    }
}
