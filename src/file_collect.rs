use crate::error::AppError;
use crate::path_norm::safe_canonicalize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CollectResult {
    pub folder: PathBuf,
    /// Candidate files in listing order (ascending file name bytes).
    pub files: Vec<PathBuf>,
    pub skipped_by_extension: usize,
}

/// Turns a user-supplied folder string into a canonical directory path.
pub fn resolve_folder(raw: &str) -> Result<PathBuf, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Input("no folder path given".to_string()));
    }
    let path = PathBuf::from(trimmed);
    if !path.exists() {
        return Err(AppError::Input(format!("folder does not exist: {}", trimmed)));
    }
    if !path.is_dir() {
        return Err(AppError::Input(format!("not a folder: {}", trimmed)));
    }
    safe_canonicalize(&path)
        .map_err(|e| AppError::Input(format!("failed to resolve folder `{}`: {}", trimmed, e)))
}

/// Lists the regular files directly inside `folder` whose extension is in
/// `allowed_extensions` (case-insensitive). Subfolders are not entered.
pub fn collect_images(folder: &Path, allowed_extensions: &[String]) -> Result<CollectResult, AppError> {
    let entries = fs::read_dir(folder).map_err(|e| {
        AppError::Enumeration(format!("failed to read folder {}: {}", folder.display(), e))
    })?;

    let mut files = Vec::new();
    let mut skipped_by_extension = 0usize;
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::Enumeration(format!("failed to read folder entry: {}", e))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if has_allowed_extension(&path, allowed_extensions) {
            files.push(path);
        } else {
            skipped_by_extension += 1;
        }
    }

    // read_dir order is platform dependent; name order gives ties a stable meaning.
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(CollectResult {
        folder: folder.to_path_buf(),
        files,
        skipped_by_extension,
    })
}

pub fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            allowed
                .iter()
                .any(|item| item.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
