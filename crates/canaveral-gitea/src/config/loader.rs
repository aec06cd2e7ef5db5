//! Configuration file loading

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::providers::ProviderConfig;

use super::defaults::config_file_names;
use super::types::GiteaOptions;

/// Contents of a configuration file.
///
/// Options may sit at the top level or under a `gitea` section; the section
/// wins when both are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GiteaConfigFile {
    /// Options nested under `gitea`
    pub gitea: Option<GiteaOptions>,

    /// Command providers for `npm:` title/notes references
    pub providers: HashMap<String, ProviderConfig>,

    /// Options written at the top level
    #[serde(flatten)]
    pub options: GiteaOptions,
}

impl GiteaConfigFile {
    /// Effective plugin options
    pub fn plugin_options(&self) -> GiteaOptions {
        self.gitea.clone().unwrap_or_else(|| self.options.clone())
    }
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<GiteaConfigFile> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: GiteaConfigFile = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else if content.trim().is_empty() {
        GiteaConfigFile::default()
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    debug!(
        path = %path.display(),
        providers = config.providers.len(),
        "config loaded"
    );
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// At each directory level the search checks `<dir>/<name>` and then
/// `<dir>/.github/<name>`. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }

            let github_path = current.join(".github").join(name);
            if github_path.exists() {
                info!(path = %github_path.display(), "found config file in .github/");
                return Some(github_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(GiteaConfigFile, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}
