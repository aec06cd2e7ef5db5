//! Zip bundles of matched files

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AssetError;

/// Deflate level used for bundles
pub const COMPRESSION_LEVEL: i64 = 9;

/// Write `entries` (source file, entry name) into a new archive at `output`.
///
/// Blocks until the archive is fully written; returns its size in bytes.
pub fn write_zip(output: &Path, entries: &[(PathBuf, String)]) -> Result<u64, AssetError> {
    let archive_err = |reason: String| AssetError::Archive {
        path: output.to_path_buf(),
        reason,
    };

    let file = File::create(output)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for (source, name) in entries {
        zip.start_file(name.as_str(), options)
            .map_err(|e| archive_err(e.to_string()))?;
        let mut input = File::open(source)?;
        std::io::copy(&mut input, &mut zip)?;
    }

    let mut writer = zip.finish().map_err(|e| archive_err(e.to_string()))?;
    writer.flush()?;
    drop(writer);

    let size = std::fs::metadata(output)?.len();
    debug!(path = %output.display(), size, entries = entries.len(), "archive written");
    Ok(size)
}

/// Async wrapper running [`write_zip`] on the blocking pool
pub async fn create_zip(
    output: PathBuf,
    entries: Vec<(PathBuf, String)>,
) -> Result<u64, AssetError> {
    let path = output.clone();
    tokio::task::spawn_blocking(move || write_zip(&output, &entries))
        .await
        .map_err(|e| AssetError::Archive {
            path,
            reason: e.to_string(),
        })?
}
