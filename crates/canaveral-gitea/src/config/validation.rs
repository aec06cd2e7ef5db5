//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::resolve::ReleaseConfig;

/// Validate a resolved configuration.
///
/// Checks run host, owner, repository in that order; the first failure is
/// returned on its own.
pub fn validate_release_config(config: &ReleaseConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::MissingHost.into());
    }
    if config.owner.trim().is_empty() {
        return Err(ConfigError::MissingOwner.into());
    }
    if config.repository.trim().is_empty() {
        return Err(ConfigError::MissingRepository.into());
    }
    debug!("configuration validation passed");
    Ok(())
}
