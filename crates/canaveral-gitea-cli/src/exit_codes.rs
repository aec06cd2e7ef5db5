//! Exit codes for the CLI

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Map a failed command to its exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<canaveral_gitea::GiteaError>() {
        Some(canaveral_gitea::GiteaError::Config(_)) => CONFIG_ERROR,
        _ => ERROR,
    }
}
