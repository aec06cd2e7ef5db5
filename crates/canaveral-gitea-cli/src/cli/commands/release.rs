//! Release command

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use canaveral_gitea::{
    GiteaPlugin, ReleaseContext, ReleaseHost, ReleasePlugin, TextProviderRegistry,
};

use super::{git_output, load_options, repo_info};
use crate::cli::{output, Cli, ConsoleHost, OutputFormat};

/// Create or update the release for a tag and upload its assets
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Version being released
    #[arg(long)]
    pub version: String,

    /// Git tag of the release (default: v<version>)
    #[arg(long)]
    pub tag: Option<String>,

    /// Previously released version
    #[arg(long, default_value = "")]
    pub latest_version: String,

    /// Package name (default: directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Branch the release is cut from (default: current branch)
    #[arg(long)]
    pub branch: Option<String>,

    /// Changelog text
    #[arg(long, conflicts_with = "changelog_file")]
    pub changelog: Option<String>,

    /// Read the changelog from a file
    #[arg(long)]
    pub changelog_file: Option<PathBuf>,

    /// Git remote URL used for repository defaults (default: origin)
    #[arg(long)]
    pub remote_url: Option<String>,

    /// Configuration file (default: nearest gitea.yaml/gitea.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dry run - log what would be published without contacting the server
    #[arg(long)]
    pub dry_run: bool,
}

impl ReleaseCommand {
    /// Tag to publish
    pub fn tag_name(&self) -> String {
        self.tag
            .clone()
            .unwrap_or_else(|| format!("v{}", self.version))
    }

    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            version = %self.version,
            tag = ?self.tag,
            dry_run = self.dry_run,
            "executing release command"
        );
        let cwd = std::env::current_dir()?;

        let (file, config_path) = load_options(self.config.as_deref(), &cwd)?;
        if config_path.is_none() && cli.prints_progress() {
            output::warning(&format!(
                "No configuration found, using defaults. Run {} to create one.",
                style("canaveral-gitea init").cyan()
            ));
        }

        let changelog = match (&self.changelog, &self.changelog_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };

        let context = ReleaseContext {
            version: self.version.clone(),
            latest_version: self.latest_version.clone(),
            changelog,
            name: self.name.clone().unwrap_or_else(|| {
                cwd.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }),
            branch_name: self
                .branch
                .clone()
                .or_else(|| git_output(&cwd, &["rev-parse", "--abbrev-ref", "HEAD"]))
                .unwrap_or_default(),
            tag_name: self.tag_name(),
            repo: repo_info(self.remote_url.as_deref(), &cwd),
            ..Default::default()
        };

        let mut providers = TextProviderRegistry::new();
        providers.load_from_configs(&file.providers);

        let host = Arc::new(ConsoleHost::new(
            context,
            self.dry_run,
            cli.prints_progress(),
            cli.verbose,
        ));
        let plugin = GiteaPlugin::new(file.plugin_options(), host.clone())
            .with_providers(providers)
            .with_working_dir(&cwd);

        plugin.release().await?;
        plugin.after_release().await?;

        let release_url = host.context().release_url;
        if cli.format == OutputFormat::Json {
            let json = serde_json::json!({
                "tag": self.tag_name(),
                "releaseUrl": release_url,
                "dryRun": self.dry_run,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else if !cli.quiet && self.dry_run {
            output::success("Dry run complete, nothing was published");
        }
        Ok(())
    }
}
