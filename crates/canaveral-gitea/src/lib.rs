//! Gitea release publishing for Canaveral
//!
//! This crate creates or updates a release on a Gitea repository for a tag
//! computed upstream, attaches build artifacts to it and reports the release
//! URL back to the orchestrator.
//!
//! ## Workflow
//!
//! 1. Resolve the effective [`ReleaseConfig`] from plugin options and the
//!    host's repository metadata
//! 2. Render the release title and notes (templates, callbacks or registered
//!    providers)
//! 3. Probe `releases/tags/{tag}` and update or create the release
//! 4. Upload configured assets, individually or bundled into a zip
//! 5. Write `releaseUrl` into the host context
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use canaveral_gitea::{GiteaOptions, GiteaPlugin, InMemoryHost, ReleasePlugin};
//!
//! let host = Arc::new(InMemoryHost::new(context));
//! let options = GiteaOptions::new()
//!     .with_host("https://gitea.example.com")
//!     .with_assets(vec!["dist/*.tar.gz".into()]);
//!
//! let plugin = GiteaPlugin::new(options, host.clone());
//! plugin.release().await?;
//! plugin.after_release().await?;
//! ```

pub mod api;
pub mod assets;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod plugin;
pub mod providers;
pub mod template;

pub use api::{build_api_url, GiteaClient, HttpTransport, ReqwestTransport};
pub use assets::AssetPipeline;
pub use config::{AssetConfig, AssetSpec, AssetType, GiteaOptions, ReleaseConfig};
pub use context::{InMemoryHost, LogLevel, ReleaseContext, ReleaseHost, RepoInfo};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{GiteaError, Result};
pub use plugin::{GiteaPlugin, ReleasePlugin};
pub use providers::{TextProvider, TextProviderRegistry, TextSource};
pub use template::interpolate;
