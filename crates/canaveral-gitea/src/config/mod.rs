//! Configuration for Gitea release publishing
//!
//! Raw options ([`GiteaOptions`]) come from the host or a config file and are
//! turned into a validated [`ReleaseConfig`] once per invocation.

pub mod defaults;
mod loader;
mod resolve;
mod types;
pub mod validation;

pub use loader::{find_config, load_config, load_config_from_dir, GiteaConfigFile};
pub use resolve::ReleaseConfig;
pub use types::{AssetConfig, AssetSpec, AssetType, GiteaOptions};
pub use validation::validate_release_config;
