use crate::capture_time::{CaptureTimeReader, ExtractionService};
use crate::error::AppError;
use crate::file_collect::{collect_images, resolve_folder};
use crate::model::{AppSettings, FolderSummary, ImageRecord, InspectResponse, TimestampSource};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Lists the recognized images in `folder` and returns them ordered by
/// capture time. Equal timestamps keep listing order.
pub fn build<R>(
    folder: &Path,
    extensions: &[String],
    reader: &R,
) -> Result<Vec<ImageRecord>, AppError>
where
    R: CaptureTimeReader + ?Sized,
{
    let collect = collect_images(folder, extensions)?;
    log::debug!(
        "{} candidate images in {} ({} other files)",
        collect.files.len(),
        folder.display(),
        collect.skipped_by_extension
    );

    // Parallel collect keeps input order, so completion order never leaks out.
    let mut records: Vec<ImageRecord> = collect
        .files
        .par_iter()
        .enumerate()
        .map(|(listing_index, path)| describe(path, listing_index, reader))
        .collect();

    sort_by_capture_time(&mut records);
    Ok(records)
}

/// Stable ascending sort on `capture_timestamp`.
pub fn sort_by_capture_time(records: &mut [ImageRecord]) {
    records.sort_by(|a, b| a.capture_timestamp.cmp(&b.capture_timestamp));
}

fn describe<R>(path: &Path, listing_index: usize, reader: &R) -> ImageRecord
where
    R: CaptureTimeReader + ?Sized,
{
    let original_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    let metadata = fs::metadata(path);
    let size_bytes = metadata.as_ref().map(|meta| meta.len()).unwrap_or(0);
    let modified = metadata
        .as_ref()
        .ok()
        .and_then(|meta| meta.modified().ok())
        .map(DateTime::<Local>::from);

    let (capture_timestamp, timestamp_source) = match reader.read_capture_time(path) {
        Some(timestamp) => (timestamp, TimestampSource::Metadata),
        None => match modified {
            Some(timestamp) => (timestamp, TimestampSource::Modified),
            None => {
                log::warn!(
                    "no capture or modification time for {}; ordering it first",
                    path.display()
                );
                (
                    DateTime::<Local>::from(SystemTime::UNIX_EPOCH),
                    TimestampSource::Unavailable,
                )
            }
        },
    };

    ImageRecord {
        path: path.to_path_buf(),
        original_name,
        capture_timestamp,
        timestamp_source,
        file_extension,
        size_bytes,
        listing_index,
    }
}

/// Image count and per-extension breakdown, without touching metadata.
pub fn summarize(folder: &Path, extensions: &[String]) -> Result<FolderSummary, AppError> {
    let collect = collect_images(folder, extensions)?;
    let mut file_types: BTreeMap<String, usize> = BTreeMap::new();
    for file in &collect.files {
        let ext = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        *file_types.entry(ext).or_insert(0) += 1;
    }
    Ok(FolderSummary {
        folder_path: folder.to_string_lossy().to_string(),
        image_count: collect.files.len(),
        file_types,
    })
}

/// Inspection flow: sorted inventory over the wider inspection extension set.
pub fn inspect(folder_path: &str, settings: &AppSettings) -> Result<InspectResponse, AppError> {
    let folder = resolve_folder(folder_path)?;
    let summary = summarize(&folder, &settings.inspect_extensions)?;
    let service = ExtractionService::open();
    let images = build(&folder, &settings.inspect_extensions, &service);
    service.close();
    Ok(InspectResponse {
        summary,
        images: images?,
    })
}
