//! Default configuration values

/// Environment variable holding the API token
pub const DEFAULT_TOKEN_REF: &str = "GITEA_TOKEN";

/// Request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Release title template
pub const DEFAULT_RELEASE_TITLE: &str = "v${version}";

/// Release notes template
pub const DEFAULT_RELEASE_NOTES: &str = "${changelog}";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec!["gitea.yaml", "gitea.toml", ".gitea.yaml", ".gitea.toml"]
}

/// Starter configuration written by `canaveral-gitea init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Gitea release configuration
gitea:
  # host: https://gitea.example.com
  # owner: my-org
  # repository: my-repo
  release: true
  releaseTitle: "v${version}"
  releaseNotes: "${changelog}"
  prerelease: false
  draft: false
  tokenRef: GITEA_TOKEN
  timeout: 30000
  assets: []
    # - dist/*.tar.gz
    # - path: "dist/**/*.map"
    #   type: zip
    #   name: sourcemaps.zip
    #   label: Source maps
"#;
