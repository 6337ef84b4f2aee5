use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// Lists files under `root` whose path relative to `root` matches `pattern`.
/// An empty result is not an error.
pub fn find_videos(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();
    let bare = root == Path::new(".");

    let mut videos = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        // symlinked videos count; walkdir reports the link itself
        if !(entry.file_type().is_file() || entry.path().is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }
        let path = if bare {
            relative.to_path_buf()
        } else {
            entry.into_path()
        };
        videos.push(path);
    }

    debug!(root = %root.display(), pattern, found = videos.len(), "discovery done");
    Ok(videos)
}
