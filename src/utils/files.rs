use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Check whether a path ends in the given extension (case-insensitive, no dot)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension.trim_start_matches('.')))
        .unwrap_or(false)
}

/// Names of regular files directly inside `directory` with the given extension.
///
/// A missing directory is treated as empty.
pub fn list_file_names(directory: &Path, extension: &str) -> HashSet<String> {
    let mut names = HashSet::new();

    if !directory.exists() {
        return names;
    }

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }

    names
}

/// Return the most recently modified file in `directory` with the given extension.
///
/// Files still being written under a temporary name never match the extension,
/// so only completed documents are considered. Ties on modification time are
/// broken by file name so the choice is stable.
pub fn latest_file(directory: &Path, extension: &str) -> Option<PathBuf> {
    if !directory.exists() {
        return None;
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_extension(path, extension) {
            continue;
        }

        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(m) => m,
            None => continue,
        };

        let is_newer = match &newest {
            None => true,
            Some((best, best_path)) => {
                modified > *best || (modified == *best && path > best_path.as_path())
            }
        };

        if is_newer {
            newest = Some((modified, path.to_path_buf()));
        }
    }

    newest.map(|(_, path)| path)
}
