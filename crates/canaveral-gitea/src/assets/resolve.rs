//! Glob resolution for asset patterns

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::AssetError;

const GLOB_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Expand `pattern` into the files it matches.
///
/// Relative patterns are anchored at `root`. `*` stays within one path
/// segment, `**` spans directories (so `docs/**` is every file under `docs`)
/// and `{a,b}` alternatives are expanded. Directories are skipped and the
/// result is sorted so upload order is stable.
pub fn resolve_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, AssetError> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let root = absolute(root);
    let is_absolute = Path::new(pattern).is_absolute();

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| AssetError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?
        .compile_matcher();

    let base = pattern_base(pattern);
    let walk_root = if is_absolute { base } else { root.join(base) };

    let mut files: Vec<PathBuf> = WalkDir::new(&walk_root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            if is_absolute {
                matcher.is_match(path)
            } else {
                path.strip_prefix(&root)
                    .map(|relative| matcher.is_match(relative))
                    .unwrap_or(false)
            }
        })
        .collect();
    files.sort();

    debug!(pattern, matched = files.len(), "resolved asset pattern");
    Ok(files)
}

/// Leading segments of `pattern` that contain no wildcard.
///
/// `dist/**/*.map` has base `dist`; `*.zip` has an empty base. A pattern
/// without wildcards is treated as a file and its parent is the base.
pub fn pattern_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let has_glob = pattern.contains(GLOB_CHARS);

    let mut base = PathBuf::new();
    let components: Vec<_> = path.components().collect();
    for (i, component) in components.iter().enumerate() {
        let is_last = i + 1 == components.len();
        let segment = component.as_os_str().to_string_lossy();
        if segment.contains(GLOB_CHARS) || (is_last && !has_glob) {
            break;
        }
        base.push(component);
    }
    base
}

/// Name of `file` inside an archive built from `pattern` rooted at `root`.
///
/// The pattern's literal base is kept and wildcard-matched directories below
/// it are preserved, so `dist/**/*.map` maps `/a/dist/js/x.map` to
/// `dist/js/x.map`.
pub fn archive_entry_name(root: &Path, pattern: &str, file: &Path) -> String {
    let base = pattern_base(pattern);
    let anchor = absolute(&root.join(&base));

    let relative = match file.strip_prefix(&anchor) {
        Ok(rest) => rest.to_path_buf(),
        Err(_) => file
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| file.to_path_buf()),
    };

    base.join(relative)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Final path segment of a pattern, wildcards included
pub fn pattern_basename(pattern: &str) -> String {
    pattern
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(pattern)
        .to_string()
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
