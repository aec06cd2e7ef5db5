//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use canaveral_gitea::config::defaults::DEFAULT_CONFIG_TEMPLATE;

use crate::cli::{output, Cli};

/// Write a starter configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long, default_value = "gitea.yaml")]
    pub output: PathBuf,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, output = %self.output.display(), "executing init command");

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                self.output.display()
            );
        }

        std::fs::write(&self.output, DEFAULT_CONFIG_TEMPLATE)?;

        if !cli.quiet {
            output::success(&format!(
                "Created {}",
                style(self.output.display()).cyan()
            ));
            println!(
                "  Set {} and run {} to publish.",
                style("GITEA_TOKEN").yellow(),
                style("canaveral-gitea release --version <x.y.z>").cyan()
            );
        }
        Ok(())
    }
}
