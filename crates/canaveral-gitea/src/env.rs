//! Token lookup through an injectable environment

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Key-value lookup standing in for the process environment
pub trait EnvSource: Send + Sync {
    /// Read one variable
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Resolve the API token named by `token_ref`.
///
/// Read on every call so a token exported after startup is still seen.
pub fn resolve_token(env: &dyn EnvSource, token_ref: &str) -> Result<String> {
    if token_ref.is_empty() {
        return Err(ConfigError::MissingTokenRef.into());
    }

    match env.var(token_ref) {
        Some(token) if !token.is_empty() => {
            debug!(token_ref, "resolved API token");
            Ok(token)
        }
        _ => Err(ConfigError::TokenNotFound(token_ref.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GiteaError;

    #[test]
    fn test_resolve_token_present() {
        let env = MapEnv::new().with_var("GITEA_TOKEN", "secret");
        assert_eq!(resolve_token(&env, "GITEA_TOKEN").unwrap(), "secret");
    }

    #[test]
    fn test_resolve_token_missing() {
        let env = MapEnv::new();
        let err = resolve_token(&env, "CUSTOM_TOKEN").unwrap_err();
        assert!(matches!(
            err,
            GiteaError::Config(ConfigError::TokenNotFound(ref name)) if name == "CUSTOM_TOKEN"
        ));
        assert!(err.to_string().contains("CUSTOM_TOKEN"));
    }

    #[test]
    fn test_resolve_token_empty_value() {
        let env = MapEnv::new().with_var("GITEA_TOKEN", "");
        assert!(resolve_token(&env, "GITEA_TOKEN").is_err());
    }

    #[test]
    fn test_resolve_token_empty_ref() {
        let env = MapEnv::new();
        let err = resolve_token(&env, "").unwrap_err();
        assert!(matches!(err, GiteaError::Config(ConfigError::MissingTokenRef)));
    }
}
