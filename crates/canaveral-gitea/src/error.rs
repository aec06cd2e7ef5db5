//! Error types for Gitea release publishing

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GiteaError
pub type Result<T> = std::result::Result<T, GiteaError>;

/// Prefix shared by every remote request failure
pub const API_ERROR_PREFIX: &str = "Gitea API request failed";

/// Prefix shared by every asset upload failure
pub const UPLOAD_ERROR_PREFIX: &str = "Asset upload failed";

/// Main error type for Gitea release operations
#[derive(Debug, Error)]
pub enum GiteaError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Remote API errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Asset upload errors
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Asset processing errors
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// A referenced title/notes provider could not be used
    #[error("{0} not found")]
    ModuleNotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl GiteaError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// HTTP status carried by a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status(),
            Self::Upload(e) => e.status(),
            _ => None,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No forge host could be resolved
    #[error("Gitea host configuration is required")]
    MissingHost,

    /// No repository owner could be resolved
    #[error("Gitea owner configuration is required")]
    MissingOwner,

    /// No repository name could be resolved
    #[error("Gitea repository configuration is required")]
    MissingRepository,

    /// The token variable name is empty
    #[error("Token environment variable name is not configured")]
    MissingTokenRef,

    /// The token variable is unset
    #[error("Gitea API token not found. Please set the {0} environment variable")]
    TokenNotFound(String),

    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote request errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The forge answered with a non-success status
    #[error("Gitea API request failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("Gitea API request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON
    #[error("Gitea API request failed: invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when the forge responded
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the forge reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Asset upload errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// The forge rejected the upload
    #[error("Asset upload failed ({status}): {body}")]
    Status { status: u16, body: String },

    /// The upload never produced a response
    #[error("Asset upload failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON
    #[error("Asset upload failed: invalid response body: {0}")]
    Decode(String),
}

impl UploadError {
    /// HTTP status code, when the forge responded
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Asset resolution and packaging errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// The glob pattern is malformed
    #[error("Invalid asset pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Building a zip bundle failed
    #[error("Failed to create archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
