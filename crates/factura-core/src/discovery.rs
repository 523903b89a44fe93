//! Finding invoice documents in a folder.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Extensions picked up by [`discover`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tiff"];

/// True when the path has a supported extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the supported documents directly inside `dir`, sorted by name.
///
/// Subdirectories are not searched. A missing or unreadable directory yields
/// an empty list.
pub fn discover(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let base = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| base.join(entry.file_name()))
        .filter(|path| is_supported(path))
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!("Found {} documents in {}", files.len(), dir.display());
    files
}
