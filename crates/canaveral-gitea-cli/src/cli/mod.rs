//! CLI definition and command handling

pub mod commands;
mod host;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{CheckCommand, InitCommand, ReleaseCommand};

pub use host::ConsoleHost;

/// canaveral-gitea - publish releases and assets to Gitea
#[derive(Debug, Parser)]
#[command(name = "canaveral-gitea")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a starter configuration file
    Init(InitCommand),

    /// Create or update the release for a tag and upload its assets
    Release(ReleaseCommand),

    /// Resolve and print the effective configuration
    Check(CheckCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Check(ref cmd) => cmd.execute(&self),
        }
    }

    /// Whether human-readable progress should be printed
    pub fn prints_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let cli = Cli::try_parse_from([
            "canaveral-gitea",
            "release",
            "--version",
            "1.2.0",
            "--changelog",
            "- fixes",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Release(ref cmd) => {
                assert_eq!(cmd.version, "1.2.0");
                assert_eq!(cmd.tag_name(), "v1.2.0");
                assert!(cmd.dry_run);
            }
            _ => panic!("expected release command"),
        }
        assert!(cli.prints_progress());
    }

    #[test]
    fn test_changelog_sources_conflict() {
        let result = Cli::try_parse_from([
            "canaveral-gitea",
            "release",
            "--version",
            "1.0.0",
            "--changelog",
            "x",
            "--changelog-file",
            "CHANGELOG.md",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli =
            Cli::try_parse_from(["canaveral-gitea", "check", "--format", "json", "-q"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
        assert!(!cli.prints_progress());
    }
}
