//! File discovery for glob-backed listings.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ViewError;

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files in `dir` matching any of `patterns`, sorted and de-duplicated.
///
/// Matching ignores case, so `*.mp4` also finds `CLIP.MP4`. A missing
/// directory is an empty listing, not an error.
pub fn discover(dir: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>, ViewError> {
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let mut found = BTreeSet::new();

    for pattern in patterns {
        for entry in glob::glob_with(&format!("{base}/{pattern}"), MATCH_OPTIONS)? {
            let path = entry.map_err(|e| ViewError::Io(e.into_error()))?;
            if path.is_file() {
                found.insert(path);
            }
        }
    }

    debug!("Discovered {} files in {}", found.len(), dir.display());
    Ok(found.into_iter().collect())
}

/// [`discover`] on the blocking pool.
pub async fn discover_blocking(
    dir: PathBuf,
    patterns: &'static [&'static str],
) -> Result<Vec<PathBuf>, ViewError> {
    tokio::task::spawn_blocking(move || discover(&dir, patterns))
        .await
        .map_err(|e| ViewError::Io(std::io::Error::other(e)))?
}

/// File name component of `path` as UTF-8, if it has one.
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
