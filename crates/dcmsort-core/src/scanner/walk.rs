use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::WalkDir;

/// Snapshot every directory under `root` (root included), sorted by name.
///
/// Directories matching an ignore pattern are pruned with their subtrees. Entries that
/// cannot be read are logged and skipped.
pub fn collect_directories(root: &Path, ignore_globs: &[String]) -> Vec<PathBuf> {
    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect();

    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !entry.file_type().is_dir()
                || !ignore_patterns
                    .iter()
                    .any(|pattern| pattern.matches_path(entry.path()))
        })
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(entry.into_path()),
            Ok(_) => None,
            Err(err) => {
                error!("Error walking {}: {}", root.display(), err);
                None
            }
        })
        .collect()
}

/// Regular files directly inside `dir`, sorted by file name. Symlinks are skipped.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
