use crate::path_norm::path_key;
use std::fs;
use std::path::Path;

/// Moves `source` to `destination` within one volume, refusing to replace an
/// existing file. Returns an optional note on success.
pub fn move_without_replace(source: &Path, destination: &Path) -> Result<Option<String>, String> {
    if source == destination {
        return Ok(Some("already named".to_string()));
    }
    if !source.is_file() {
        return Err(format!("source file not found: {}", source.display()));
    }

    // On case-insensitive volumes the target "exists" because it is the source.
    if is_case_only_self_rename(source, destination) {
        rename_same_file(source, destination)?;
        return Ok(None);
    }
    if destination.exists() {
        return Err(format!("target already exists: {}", destination.display()));
    }

    rename_no_replace(source, destination)?;
    Ok(None)
}

/// True when the two paths differ only in letter case and name one file.
pub(crate) fn is_case_only_self_rename(source: &Path, destination: &Path) -> bool {
    source != destination
        && path_key(source) == path_key(destination)
        && is_same_file(source, destination)
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(left), Ok(right)) => left.dev() == right.dev() && left.ino() == right.ino(),
        _ => false,
    }
}

// Windows volumes are case-insensitive, and MoveFileExW rejects a distinct
// existing target on its own.
#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> bool {
    a.exists() && b.exists()
}

#[cfg(unix)]
fn rename_same_file(source: &Path, destination: &Path) -> Result<(), String> {
    fs::rename(source, destination).map_err(|e| format!("rename failed: {}", e))
}

#[cfg(not(unix))]
fn rename_same_file(source: &Path, destination: &Path) -> Result<(), String> {
    rename_no_replace(source, destination)
}

/// Links the new name, then drops the old one. `link` fails with EEXIST when
/// the target appeared after the existence check, so nothing is overwritten.
#[cfg(not(target_os = "windows"))]
fn rename_no_replace(source: &Path, destination: &Path) -> Result<(), String> {
    use std::io::ErrorKind;

    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(format!("rename failed: {}", e));
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(format!(
            "target already exists: {}",
            destination.display()
        )),
        // FAT and exFAT cards have no hard links. There the existence check
        // and the rename are two steps, so a racing writer can be replaced.
        Err(e) if matches!(e.kind(), ErrorKind::PermissionDenied | ErrorKind::Unsupported) => {
            log::debug!(
                "hard link unavailable for {} ({}); using plain rename",
                source.display(),
                e
            );
            fs::rename(source, destination).map_err(|e| format!("rename failed: {}", e))
        }
        Err(e) => Err(format!("rename failed: {}", e)),
    }
}

#[cfg(target_os = "windows")]
fn rename_no_replace(source: &Path, destination: &Path) -> Result<(), String> {
    use std::ffi::OsStr;
    use std::iter;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{MoveFileExW, MOVEFILE_WRITE_THROUGH};

    fn wide(value: &OsStr) -> Vec<u16> {
        value.encode_wide().chain(iter::once(0)).collect()
    }

    let source_w = wide(source.as_os_str());
    let destination_w = wide(destination.as_os_str());
    // No MOVEFILE_REPLACE_EXISTING and no MOVEFILE_COPY_ALLOWED: same-volume move only.
    let result =
        unsafe { MoveFileExW(source_w.as_ptr(), destination_w.as_ptr(), MOVEFILE_WRITE_THROUGH) };
    if result == 0 {
        return Err(format!(
            "MoveFileExW failed: {}",
            std::io::Error::last_os_error()
        ));
    }
    Ok(())
}
