//! Command implementations

mod check;
mod init;
mod release;

pub use check::CheckCommand;
pub use init::InitCommand;
pub use release::ReleaseCommand;

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use canaveral_gitea::config::{find_config, load_config, GiteaConfigFile};
use canaveral_gitea::RepoInfo;

/// Load the config file named on the command line, or the nearest one found
/// from `cwd`. A missing file yields empty options.
pub(crate) fn load_options(
    explicit: Option<&Path>,
    cwd: &Path,
) -> canaveral_gitea::Result<(GiteaConfigFile, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(cwd),
    };

    match path {
        Some(path) => Ok((load_config(&path)?, Some(path))),
        None => {
            debug!("no config file, using empty options");
            Ok((GiteaConfigFile::default(), None))
        }
    }
}

/// Repository metadata from `remote_url`, or from the `origin` remote
pub(crate) fn repo_info(remote_url: Option<&str>, cwd: &Path) -> RepoInfo {
    let remote = remote_url
        .map(str::to_string)
        .or_else(|| git_output(cwd, &["remote", "get-url", "origin"]));

    match remote {
        Some(url) => RepoInfo::from_remote_url(&url).unwrap_or_else(|| {
            warn!(remote = %url, "could not parse remote URL");
            RepoInfo::default()
        }),
        None => RepoInfo::default(),
    }
}

/// Trimmed stdout of a successful git command
pub(crate) fn git_output(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(cwd).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
