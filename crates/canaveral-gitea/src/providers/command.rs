//! Providers backed by external executables
//!
//! The command receives a JSON request on stdin and answers on stdout:
//!
//! ```text
//! -> {"action": "releaseNotes", "input": { ...release context... }}
//! <- {"output": "text"}            on success
//! <- {"error": "what went wrong"}  on failure
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{TextField, TextProvider};
use crate::context::ReleaseContext;
use crate::error::{GiteaError, Result};

/// Configuration of a command provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Executable to run
    pub command: String,
    /// Extra arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    /// Fields the command can produce
    #[serde(default = "default_provides")]
    pub provides: Vec<TextField>,
}

fn default_provides() -> Vec<TextField> {
    vec![TextField::Title, TextField::Notes]
}

/// Request sent to the provider on stdin
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// Field being rendered
    pub action: TextField,
    /// Full release context
    pub input: ReleaseContext,
}

/// Response read from the provider's stdout
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Rendered text (on success)
    pub output: Option<String>,
    /// Error message (on failure)
    pub error: Option<String>,
}

/// Text provider that runs as a subprocess
#[derive(Debug, Clone)]
pub struct CommandTextProvider {
    name: String,
    command: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    provides: Vec<TextField>,
}

impl CommandTextProvider {
    /// Create a provider exposing both fields
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            provides: default_provides(),
        }
    }

    /// Build from configuration
    pub fn from_config(name: &str, config: &ProviderConfig) -> Self {
        Self {
            name: name.to_string(),
            command: config.command.clone(),
            args: config.args.clone(),
            cwd: config.cwd.clone(),
            provides: config.provides.clone(),
        }
    }

    /// Set arguments
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Restrict the fields this provider answers for
    pub fn with_provides(mut self, provides: Vec<TextField>) -> Self {
        self.provides = provides;
        self
    }
}

impl TextProvider for CommandTextProvider {
    fn provides(&self, field: TextField) -> bool {
        self.provides.contains(&field)
    }

    #[instrument(skip(self, context), fields(provider = %self.name, field = %field))]
    fn render(&self, field: TextField, context: &ReleaseContext) -> Result<String> {
        let request = ProviderRequest {
            action: field,
            input: context.clone(),
        };
        let request_json = serde_json::to_string(&request)?;

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|e| {
            GiteaError::other(format!("Failed to spawn provider '{}': {}", self.name, e))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(request_json.as_bytes()).map_err(|e| {
                GiteaError::other(format!("Failed to write to provider '{}': {}", self.name, e))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            GiteaError::other(format!("Provider '{}' execution failed: {}", self.name, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GiteaError::other(format!(
                "Provider '{}' failed: {}",
                self.name,
                stderr.trim()
            )));
        }

        let response: ProviderResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            GiteaError::other(format!("Invalid response from provider '{}': {}", self.name, e))
        })?;

        if let Some(error) = response.error {
            return Err(GiteaError::other(format!(
                "Provider '{}' error: {}",
                self.name, error
            )));
        }

        debug!("provider returned text");
        Ok(response.output.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_defaults() {
        let config: ProviderConfig = serde_json::from_str(r#"{"command": "notes-gen"}"#).unwrap();
        assert!(config.args.is_empty());
        assert_eq!(config.provides, vec![TextField::Title, TextField::Notes]);
    }

    #[test]
    fn test_provider_config_provides() {
        let config: ProviderConfig =
            serde_json::from_str(r#"{"command": "notes-gen", "provides": ["releaseNotes"]}"#)
                .unwrap();
        let provider = CommandTextProvider::from_config("notes", &config);
        assert!(provider.provides(TextField::Notes));
        assert!(!provider.provides(TextField::Title));
    }

    #[test]
    fn test_request_format() {
        let request = ProviderRequest {
            action: TextField::Notes,
            input: ReleaseContext {
                version: "1.0.0".to_string(),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "releaseNotes");
        assert_eq!(json["input"]["version"], "1.0.0");
    }

    #[test]
    fn test_missing_executable() {
        let provider = CommandTextProvider::new("ghost", "definitely-not-a-real-command-xyz");
        let err = provider
            .render(TextField::Title, &ReleaseContext::default())
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_via_shell() {
        let provider = CommandTextProvider::new("echo", "sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"output": "from shell"}'"#.to_string(),
        ]);
        let out = provider
            .render(TextField::Notes, &ReleaseContext::default())
            .unwrap();
        assert_eq!(out, "from shell");
    }

    #[cfg(unix)]
    #[test]
    fn test_render_reports_provider_error() {
        let provider = CommandTextProvider::new("broken", "sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"error": "no changelog"}'"#.to_string(),
        ]);
        let err = provider
            .render(TextField::Notes, &ReleaseContext::default())
            .unwrap_err();
        assert!(err.to_string().contains("no changelog"));
    }
}
