//! Release asset pipeline
//!
//! Each configured asset is normalized, its pattern expanded, and the matches
//! uploaded either one by one or as a single zip bundle. Assets are handled
//! strictly in order, and a failing asset never stops the ones after it.

mod archive;
mod resolve;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::api::GiteaClient;
use crate::config::{AssetConfig, AssetSpec, AssetType};
use crate::context::{LogLevel, ReleaseHost};
use crate::error::Result;

pub use archive::{create_zip, write_zip, COMPRESSION_LEVEL};
pub use resolve::{archive_entry_name, pattern_base, pattern_basename, resolve_files};

/// Uploaded name of a single matched file
pub fn file_upload_name(config: &AssetConfig, file: &Path) -> String {
    config.name.clone().unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    })
}

/// Uploaded name of a zip bundle
pub fn zip_upload_name(config: &AssetConfig) -> String {
    config
        .name
        .clone()
        .unwrap_or_else(|| format!("{}.zip", pattern_basename(&config.path)))
}

/// What one asset would upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPlan {
    /// Normalized asset configuration
    pub config: AssetConfig,
    /// Files matched by the pattern
    pub files: Vec<PathBuf>,
    /// Names the uploads would carry
    pub uploads: Vec<String>,
}

/// Resolve assets without uploading anything.
///
/// Uses the same matching and naming as a real upload. Assets whose pattern
/// is invalid or matches nothing yield a plan with no uploads.
pub fn plan_assets(root: &Path, assets: &[AssetSpec]) -> Vec<AssetPlan> {
    assets
        .iter()
        .map(|spec| {
            let config = spec.normalize();
            let files = resolve_files(root, &config.path).unwrap_or_default();
            let uploads = if files.is_empty() {
                Vec::new()
            } else {
                match config.asset_type {
                    AssetType::Zip => vec![zip_upload_name(&config)],
                    AssetType::File => files.iter().map(|f| file_upload_name(&config, f)).collect(),
                }
            };
            AssetPlan {
                config,
                files,
                uploads,
            }
        })
        .collect()
}

/// Uploads configured assets to one release
pub struct AssetPipeline {
    client: GiteaClient,
    host: Arc<dyn ReleaseHost>,
    root: PathBuf,
}

impl AssetPipeline {
    /// Create a pipeline resolving relative patterns against `root`
    pub fn new(client: GiteaClient, host: Arc<dyn ReleaseHost>, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            host,
            root: root.into(),
        }
    }

    /// Upload every asset to `release_id`.
    ///
    /// Never fails: problems with one asset are logged and the next asset is
    /// processed.
    #[instrument(skip(self, assets), fields(count = assets.len()))]
    pub async fn upload_assets(&self, release_id: u64, assets: &[AssetSpec]) {
        if assets.is_empty() {
            self.host.log(LogLevel::Verbose, "No assets configured, skipping upload");
            return;
        }

        self.host.log(LogLevel::Info, &format!("Uploading {} asset(s)...", assets.len()));

        let mut workdir = None;
        for (index, spec) in assets.iter().enumerate() {
            let config = spec.normalize();
            if let Err(e) = self
                .process_asset(release_id, index, &config, &mut workdir)
                .await
            {
                let json = serde_json::to_string(spec).unwrap_or_else(|_| format!("{:?}", spec));
                self.host.log(
                    LogLevel::Error,
                    &format!("Failed to process asset {}: {}", json, e),
                );
            }
        }

        self.host.log(LogLevel::Info, "All assets processed");
    }

    async fn process_asset(
        &self,
        release_id: u64,
        index: usize,
        config: &AssetConfig,
        workdir: &mut Option<TempDir>,
    ) -> Result<()> {
        let files = match resolve_files(&self.root, &config.path) {
            Ok(files) => files,
            Err(e) => {
                self.host.log(LogLevel::Warn, &e.to_string());
                return Ok(());
            }
        };

        if files.is_empty() {
            self.host.log(
                LogLevel::Warn,
                &format!("No files matched pattern: {}", config.path),
            );
            return Ok(());
        }

        match config.asset_type {
            AssetType::File => {
                for file in &files {
                    let name = file_upload_name(config, file);
                    self.client
                        .upload_asset(release_id, file, &name, config.label.as_deref())
                        .await?;
                    self.host.log(LogLevel::Info, &format!("Uploaded asset: {}", name));
                }
            }
            AssetType::Zip => {
                let name = zip_upload_name(config);
                // Upload names may contain separators; the local archive never does.
                let archive_name = format!("asset-{}.zip", index);
                if workdir.is_none() {
                    *workdir = Some(
                        tempfile::Builder::new()
                            .prefix("canaveral-gitea-")
                            .tempdir()?,
                    );
                }
                let archive_path = workdir
                    .as_ref()
                    .map(|dir| dir.path().join(&archive_name))
                    .unwrap_or_else(|| std::env::temp_dir().join(&archive_name));

                let entries: Vec<_> = files
                    .iter()
                    .map(|f| (f.clone(), archive_entry_name(&self.root, &config.path, f)))
                    .collect();
                let size = create_zip(archive_path.clone(), entries).await?;
                self.host.log(
                    LogLevel::Verbose,
                    &format!("Created archive {} ({} bytes)", archive_path.display(), size),
                );

                let uploaded = self
                    .client
                    .upload_asset(release_id, &archive_path, &name, config.label.as_deref())
                    .await;

                if let Err(e) = tokio::fs::remove_file(&archive_path).await {
                    self.host.log(
                        LogLevel::Warn,
                        &format!(
                            "Failed to remove temporary archive {}: {}",
                            archive_path.display(),
                            e
                        ),
                    );
                }

                uploaded?;
                self.host.log(LogLevel::Info, &format!("Uploaded asset: {}", name));
            }
        }

        debug!(pattern = %config.path, "asset processed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::config::{GiteaOptions, ReleaseConfig};
    use crate::context::{InMemoryHost, ReleaseContext, RepoInfo};
    use crate::env::MapEnv;
    use reqwest::Method;
    use std::io::Cursor;

    const ASSET_OK: &str = r#"{"id": 5, "name": "asset"}"#;

    fn client(transport: Arc<MockTransport>) -> GiteaClient {
        let options = GiteaOptions::new()
            .with_host("https://gitea.example.com")
            .with_owner("o")
            .with_repository("r");
        let config = ReleaseConfig::resolve(&options, &RepoInfo::default()).unwrap();
        GiteaClient::new(
            config,
            transport,
            Arc::new(MapEnv::new().with_var("GITEA_TOKEN", "secret")),
        )
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_upload_names() {
        let plain = AssetConfig::new("dist/*.tar.gz");
        assert_eq!(
            file_upload_name(&plain, Path::new("/a/dist/app.tar.gz")),
            "app.tar.gz"
        );
        assert_eq!(
            file_upload_name(&plain.clone().with_name("x.tgz"), Path::new("/a/dist/app.tar.gz")),
            "x.tgz"
        );
        assert_eq!(zip_upload_name(&AssetConfig::new("docs").zip()), "docs.zip");
        assert_eq!(
            zip_upload_name(&AssetConfig::new("dist/**/*.map").zip()),
            "*.map.zip"
        );
        assert_eq!(
            zip_upload_name(&AssetConfig::new("dist/**").zip().with_name("dist.zip")),
            "dist.zip"
        );
    }

    #[tokio::test]
    async fn test_failed_asset_does_not_stop_the_rest() {
        let temp = tempfile::TempDir::new().unwrap();
        touch(temp.path(), "dist/app.bin");

        let transport = Arc::new(MockTransport::new().route(
            Method::POST,
            "/releases/1/assets",
            201,
            ASSET_OK,
        ));
        let host = Arc::new(InMemoryHost::new(ReleaseContext::default()));
        let pipeline = AssetPipeline::new(client(transport.clone()), host.clone(), temp.path());

        pipeline
            .upload_assets(1, &[AssetSpec::from("missing/*.bin"), AssetSpec::from("dist/*.bin")])
            .await;

        let warnings = host.messages(LogLevel::Warn);
        assert_eq!(warnings, vec!["No files matched pattern: missing/*.bin".to_string()]);
        assert!(host
            .messages(LogLevel::Info)
            .contains(&"Uploaded asset: app.bin".to_string()));
        assert_eq!(transport.uploads().len(), 1);
        assert_eq!(transport.uploads()[0].file_name, "app.bin");
    }

    #[tokio::test]
    async fn test_upload_error_is_logged_and_contained() {
        let temp = tempfile::TempDir::new().unwrap();
        touch(temp.path(), "a/one.txt");
        touch(temp.path(), "b/two.txt");

        let transport = Arc::new(
            MockTransport::new()
                .route(Method::POST, "/releases/2/assets", 500, "disk full"),
        );
        let host = Arc::new(InMemoryHost::new(ReleaseContext::default()));
        let pipeline = AssetPipeline::new(client(transport.clone()), host.clone(), temp.path());

        let assets = vec![
            AssetSpec::from(AssetConfig::new("a/*.txt").with_label("First")),
            AssetSpec::from("b/*.txt"),
        ];
        pipeline.upload_assets(2, &assets).await;

        let errors = host.messages(LogLevel::Error);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains(r#""path":"a/*.txt""#));
        assert!(errors[0].contains("disk full"));
        assert_eq!(transport.uploads().len(), 2);
        assert_eq!(
            host.messages(LogLevel::Info).last().map(String::as_str),
            Some("All assets processed")
        );
    }

    #[tokio::test]
    async fn test_zip_asset_preserves_structure_and_cleans_up() {
        let temp = tempfile::TempDir::new().unwrap();
        touch(temp.path(), "dist/js/x.map");
        touch(temp.path(), "dist/css/y.map");
        touch(temp.path(), "dist/js/app.js");

        let transport = Arc::new(MockTransport::new().route(
            Method::POST,
            "/releases/3/assets",
            201,
            ASSET_OK,
        ));
        let host = Arc::new(InMemoryHost::new(ReleaseContext::default()));
        let pipeline = AssetPipeline::new(client(transport.clone()), host.clone(), temp.path());

        let spec = AssetConfig::new("dist/**/*.map")
            .zip()
            .with_name("sourcemaps.zip")
            .with_label("Source maps");
        pipeline.upload_assets(3, &[spec.into()]).await;

        let uploads = transport.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "sourcemaps.zip");
        assert_eq!(uploads[0].label.as_deref(), Some("Source maps"));

        let mut archive = zip::ZipArchive::new(Cursor::new(uploads[0].content.clone())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["dist/css/y.map", "dist/js/x.map"]);
        assert!(archive.by_name("dist/js/x.map").is_ok());

        let requests = transport.requests();
        match &requests[0].body {
            crate::api::RequestBody::Multipart(upload) => assert!(!upload.path.exists()),
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zip_asset_whole_directory_with_nested_name() {
        let temp = tempfile::TempDir::new().unwrap();
        touch(temp.path(), "docs/a.md");
        touch(temp.path(), "docs/sub/b.md");

        let transport = Arc::new(MockTransport::new().route(
            Method::POST,
            "/releases/4/assets",
            201,
            ASSET_OK,
        ));
        let host = Arc::new(InMemoryHost::new(ReleaseContext::default()));
        let pipeline = AssetPipeline::new(client(transport.clone()), host.clone(), temp.path());

        let spec = AssetConfig::new("docs/**").zip().with_name("bundles/docs.zip");
        pipeline.upload_assets(4, &[spec.into()]).await;

        assert!(host.messages(LogLevel::Error).is_empty());
        let uploads = transport.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "bundles/docs.zip");

        let mut archive = zip::ZipArchive::new(Cursor::new(uploads[0].content.clone())).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["docs/a.md", "docs/sub/b.md"]);
        assert!(archive.by_name("docs/sub/b.md").is_ok());
    }

    #[tokio::test]
    async fn test_no_assets_is_quiet() {
        let transport = Arc::new(MockTransport::new());
        let host = Arc::new(InMemoryHost::new(ReleaseContext::default()));
        let pipeline = AssetPipeline::new(client(transport.clone()), host.clone(), ".");

        pipeline.upload_assets(1, &[]).await;
        assert!(transport.requests().is_empty());
        assert!(host.messages(LogLevel::Info).is_empty());
    }

    #[test]
    fn test_plan_assets() {
        let temp = tempfile::TempDir::new().unwrap();
        touch(temp.path(), "dist/a.bin");
        touch(temp.path(), "dist/b.bin");

        let plans = plan_assets(
            temp.path(),
            &[
                AssetSpec::from("dist/*.bin"),
                AssetConfig::new("dist/*.bin").zip().into(),
                AssetSpec::from("nothing/*"),
            ],
        );
        assert_eq!(plans[0].uploads, vec!["a.bin", "b.bin"]);
        assert_eq!(plans[1].uploads, vec!["*.bin.zip"]);
        assert_eq!(plans[1].files.len(), 2);
        assert!(plans[2].uploads.is_empty());
    }
}
