use crate::error::AppError;
use crate::model::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_DIR_NAME: &str = "shotlist-renamer";
const SETTINGS_FILE_NAME: &str = "settings.json";

pub fn settings_file_path() -> Result<PathBuf, AppError> {
    let mut dir = dirs::config_dir()
        .ok_or_else(|| AppError::Settings("no config directory on this platform".to_string()))?;
    dir.push(SETTINGS_DIR_NAME);
    dir.push(SETTINGS_FILE_NAME);
    Ok(dir)
}

/// Loads settings from `explicit` if given, else from the default location.
/// A missing default file means defaults; a missing explicit file is an error.
pub fn load_settings(explicit: Option<&Path>) -> Result<AppSettings, AppError> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(AppError::Settings(format!(
                    "settings file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let path = settings_file_path()?;
            if !path.exists() {
                return Ok(AppSettings::default());
            }
            path
        }
    };

    let content = fs::read_to_string(&path).map_err(|e| AppError::Settings(e.to_string()))?;
    let parsed: AppSettings = serde_json::from_str(&content)
        .map_err(|e| AppError::Settings(format!("{}: {}", path.display(), e)))?;
    let settings = normalize_settings(parsed);
    validate_settings(&settings)?;
    log::debug!("loaded settings from {}", path.display());
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    validate_settings(settings)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::Settings(e.to_string()))?;
    }
    let body =
        serde_json::to_string_pretty(settings).map_err(|e| AppError::Settings(e.to_string()))?;
    fs::write(path, body).map_err(|e| AppError::Settings(e.to_string()))
}

fn normalize_settings(mut settings: AppSettings) -> AppSettings {
    settings.rename_extensions = normalize_extensions(&settings.rename_extensions);
    settings.inspect_extensions = normalize_extensions(&settings.inspect_extensions);
    settings.file_name_column = settings.file_name_column.trim().to_string();
    settings
}

fn normalize_extensions(values: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let ext = value.trim().trim_start_matches('.').to_ascii_lowercase();
        if !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

fn validate_settings(settings: &AppSettings) -> Result<(), AppError> {
    for (label, extensions) in [
        ("renameExtensions", &settings.rename_extensions),
        ("inspectExtensions", &settings.inspect_extensions),
    ] {
        if extensions.is_empty() {
            return Err(AppError::Settings(format!(
                "{} needs at least one extension",
                label
            )));
        }
        for ext in extensions {
            let trimmed = ext.trim().trim_start_matches('.');
            if trimmed.is_empty()
                || trimmed
                    .chars()
                    .any(|c| c == '/' || c == '\\' || c == '.' || c.is_whitespace())
            {
                return Err(AppError::Settings(format!(
                    "{} contains an invalid extension `{}`",
                    label, ext
                )));
            }
        }
    }
    if settings.file_name_column.trim().is_empty() {
        return Err(AppError::Settings(
            "fileNameColumn must not be empty".to_string(),
        ));
    }
    Ok(())
}
