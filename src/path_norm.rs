use std::path::{Path, PathBuf};

/// `canonicalize()` wrapper that strips the Windows `\\?\` prefix.
pub fn safe_canonicalize(path: &Path) -> std::io::Result<PathBuf> {
    let canonical = path.canonicalize()?;
    Ok(strip_verbatim(canonical))
}

#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        path
    }
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    path
}

/// Comparison key for destinations. Case-folded so that two rows differing
/// only by case collide on case-insensitive volumes too.
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
