//! Release plugin driving the Gitea workflow

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::{build_api_url, GiteaClient, HttpTransport, ReleasePayload, ReqwestTransport};
use crate::assets::{plan_assets, AssetPipeline};
use crate::config::{GiteaOptions, ReleaseConfig};
use crate::context::{LogLevel, ReleaseHost, RELEASE_URL_KEY};
use crate::env::{EnvSource, ProcessEnv};
use crate::error::Result;
use crate::providers::{resolve_notes, resolve_title, TextProviderRegistry};

/// Lifecycle hooks a release orchestrator calls on its plugins
#[async_trait::async_trait]
pub trait ReleasePlugin: Send + Sync {
    /// Plugin name
    fn name(&self) -> &str;

    /// Publish the release; called once per run
    async fn release(&self) -> Result<()>;

    /// Called once after every plugin's release step
    async fn after_release(&self) -> Result<()>;
}

/// Publishes releases and their assets to a Gitea repository
pub struct GiteaPlugin {
    options: GiteaOptions,
    host: Arc<dyn ReleaseHost>,
    transport: Arc<dyn HttpTransport>,
    env: Arc<dyn EnvSource>,
    providers: TextProviderRegistry,
    working_dir: PathBuf,
}

impl GiteaPlugin {
    /// Create a plugin with the production transport and process environment
    pub fn new(options: GiteaOptions, host: Arc<dyn ReleaseHost>) -> Self {
        Self {
            options,
            host,
            transport: Arc::new(ReqwestTransport::new()),
            env: Arc::new(ProcessEnv),
            providers: TextProviderRegistry::new(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Replace the HTTP transport
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the environment used for token lookup
    pub fn with_env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    /// Set the registry consulted for `npm:` references
    pub fn with_providers(mut self, providers: TextProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Directory relative asset patterns are resolved against
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Whether options enable publishing; absent options count as enabled
    pub fn is_enabled(options: Option<&GiteaOptions>) -> bool {
        options.map_or(true, GiteaOptions::is_enabled)
    }

    /// Effective configuration, resolved against the current host context
    pub fn config(&self) -> Result<ReleaseConfig> {
        ReleaseConfig::resolve(&self.options, &self.host.context().repo)
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.host.log(level, message);
    }

    async fn publish(&self) -> Result<()> {
        let config = self.config()?;

        if !config.release {
            self.log(LogLevel::Info, "Gitea release is disabled");
            return Ok(());
        }

        let context = self.host.context();
        let tag = context.tag_name.clone();
        let title = resolve_title(config.release_title.as_ref(), &context, &self.providers)?;
        let notes = resolve_notes(config.release_notes.as_ref(), &context, &self.providers)?;

        self.log(LogLevel::Info, &format!("Preparing Gitea release: {}", title));

        let payload = ReleasePayload {
            tag_name: tag.clone(),
            name: title,
            body: notes,
            draft: config.draft,
            prerelease: config.prerelease,
        };

        if self.host.is_dry_run() {
            self.describe(&config, &payload);
            return Ok(());
        }

        let client = GiteaClient::new(config.clone(), self.transport.clone(), self.env.clone());

        let release = if client.release_exists(&tag).await? {
            self.log(LogLevel::Info, &format!("Release {} already exists, updating...", tag));
            let release = client.update_release(&tag, &payload).await?;
            self.log(LogLevel::Info, &format!("Gitea release updated: {}", release.html_url));
            release
        } else {
            self.log(LogLevel::Info, &format!("Creating release {}...", tag));
            let release = client.create_release(&payload).await?;
            self.log(LogLevel::Info, &format!("Gitea release created: {}", release.html_url));
            release
        };

        if !config.assets.is_empty() {
            AssetPipeline::new(client, self.host.clone(), self.working_dir.clone())
                .upload_assets(release.id, &config.assets)
                .await;
        }

        self.host.set_context(RELEASE_URL_KEY, &release.html_url);
        debug!(url = %release.html_url, "release URL published to context");
        Ok(())
    }

    /// Dry-run report of what `publish` would send
    fn describe(&self, config: &ReleaseConfig, payload: &ReleasePayload) {
        let url = build_api_url(&config.host, &format!("{}/releases", config.repo_path()));
        self.log(
            LogLevel::Info,
            &format!(
                "[dry run] Would create or update release {} \"{}\" at {} (draft: {}, prerelease: {})",
                payload.tag_name, payload.name, url, payload.draft, payload.prerelease
            ),
        );
        self.log(LogLevel::Verbose, &format!("[dry run] Release notes:\n{}", payload.body));

        for plan in plan_assets(&self.working_dir, &config.assets) {
            if plan.uploads.is_empty() {
                self.log(
                    LogLevel::Warn,
                    &format!("[dry run] No files matched pattern: {}", plan.config.path),
                );
                continue;
            }
            for name in &plan.uploads {
                self.log(
                    LogLevel::Info,
                    &format!(
                        "[dry run] Would upload asset {} ({} file(s) from {})",
                        name,
                        plan.files.len(),
                        plan.config.path
                    ),
                );
            }
        }
    }
}

#[async_trait::async_trait]
impl ReleasePlugin for GiteaPlugin {
    fn name(&self) -> &str {
        "gitea"
    }

    #[instrument(skip(self), name = "gitea_release")]
    async fn release(&self) -> Result<()> {
        let result = self.publish().await;
        if let Err(e) = &result {
            self.log(LogLevel::Error, &format!("Failed to create Gitea release: {}", e));
        }
        result
    }

    async fn after_release(&self) -> Result<()> {
        if let Some(url) = self.host.context().release_url.filter(|u| !u.is_empty()) {
            self.log(LogLevel::Info, &format!("Release complete! View it at: {}", url));
        }
        Ok(())
    }
}

impl std::fmt::Debug for GiteaPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaPlugin")
            .field("options", &self.options)
            .field("providers", &self.providers)
            .field("working_dir", &self.working_dir)
            .finish()
    }
}
