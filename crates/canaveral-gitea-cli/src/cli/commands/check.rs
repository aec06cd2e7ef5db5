//! Check command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use canaveral_gitea::assets::plan_assets;
use canaveral_gitea::{build_api_url, ReleaseConfig};

use super::{load_options, repo_info};
use crate::cli::{output, Cli, OutputFormat};

/// Resolve and print the effective configuration without contacting the server
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Configuration file (default: nearest gitea.yaml/gitea.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Git remote URL used for repository defaults (default: origin)
    #[arg(long)]
    pub remote_url: Option<String>,
}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(config = ?self.config, "executing check command");
        let cwd = std::env::current_dir()?;

        let (file, config_path) = load_options(self.config.as_deref(), &cwd)?;
        let repo = repo_info(self.remote_url.as_deref(), &cwd);
        let config = ReleaseConfig::resolve(&file.plugin_options(), &repo)?;
        let plans = plan_assets(&cwd, &config.assets);

        if cli.format == OutputFormat::Json {
            let assets: Vec<_> = plans
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "path": p.config.path,
                        "type": p.config.asset_type.as_str(),
                        "matched": p.files.len(),
                        "uploads": p.uploads,
                    })
                })
                .collect();
            let json = serde_json::json!({
                "configFile": config_path,
                "config": config,
                "apiUrl": build_api_url(&config.host, &config.repo_path()),
                "tokenPresent": std::env::var(&config.token_ref).is_ok(),
                "providers": file.providers.keys().collect::<Vec<_>>(),
                "assets": assets,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        if cli.quiet {
            return Ok(());
        }

        println!("{}", output::header("Gitea release configuration"));
        match &config_path {
            Some(path) => println!(
                "{}",
                output::key_value("Config file", &path.display().to_string())
            ),
            None => println!("{}", output::key_value("Config file", "(none)")),
        }
        println!("{}", output::key_value("API", &build_api_url(&config.host, &config.repo_path())));
        println!("{}", output::key_value("Release", &config.release.to_string()));
        println!("{}", output::key_value("Draft", &config.draft.to_string()));
        println!("{}", output::key_value("Pre-release", &config.prerelease.to_string()));
        println!("{}", output::key_value("Timeout", &format!("{}ms", config.timeout)));
        if let Some(title) = &config.release_title {
            println!("{}", output::key_value("Title", &title.to_string()));
        }
        if let Some(notes) = &config.release_notes {
            println!("{}", output::key_value("Notes", &notes.to_string()));
        }

        if std::env::var(&config.token_ref).is_ok() {
            println!("{}", output::key_value("Token", &format!("${} is set", config.token_ref)));
        } else {
            output::warning(&format!("{} is not set", config.token_ref));
        }

        if !file.providers.is_empty() {
            let mut names: Vec<_> = file.providers.keys().cloned().collect();
            names.sort();
            println!("{}", output::key_value("Providers", &names.join(", ")));
        }

        for plan in &plans {
            if plan.uploads.is_empty() {
                output::warning(&format!("No files matched pattern: {}", plan.config.path));
            } else {
                println!(
                    "{}",
                    output::key_value(
                        &format!(
                            "Asset {} ({})",
                            plan.config.path,
                            plan.config.asset_type.as_str()
                        ),
                        &plan.uploads.join(", "),
                    )
                );
            }
        }

        output::success("Configuration is valid");
        Ok(())
    }
}
