use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use exif::{Exif, In, Reader, Tag, Value};
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Source of capture timestamps for the inventory builder.
///
/// Implementations must not fail past this boundary: anything unreadable is
/// reported as `None` and the caller falls back to the modification time.
pub trait CaptureTimeReader: Sync {
    fn read_capture_time(&self, path: &Path) -> Option<DateTime<Local>>;
}

/// TIFF-structured camera raw formats, parsed as a whole file.
const RAW_EXTENSIONS: &[&str] = &["arw", "cr2", "nef", "dng", "tif", "tiff"];

/// Capture-time tags in priority order.
const CAPTURE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatFamily {
    /// JPEG, PNG and other containers with an embedded EXIF block.
    Raster,
    Raw,
}

pub fn format_family(path: &Path) -> FormatFamily {
    let is_raw = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RAW_EXTENSIONS.iter().any(|raw| raw.eq_ignore_ascii_case(ext)))
        .unwrap_or(false);
    if is_raw {
        FormatFamily::Raw
    } else {
        FormatFamily::Raster
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub files_read: usize,
    pub metadata_hits: usize,
    pub fallbacks: usize,
}

/// EXIF-backed reader. Open one per run and close it when the inventory is
/// built; the counters are shared by the parallel readers.
#[derive(Debug)]
pub struct ExtractionService {
    opened_at: Instant,
    files_read: AtomicUsize,
    metadata_hits: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl ExtractionService {
    pub fn open() -> Self {
        Self {
            opened_at: Instant::now(),
            files_read: AtomicUsize::new(0),
            metadata_hits: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        }
    }

    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            files_read: self.files_read.load(Ordering::SeqCst),
            metadata_hits: self.metadata_hits.load(Ordering::SeqCst),
            fallbacks: self.fallbacks.load(Ordering::SeqCst),
        }
    }

    pub fn close(self) -> ExtractionStats {
        let stats = self.stats();
        log::info!(
            "metadata extraction finished in {:?}: {} files, {} with capture time, {} fell back",
            self.opened_at.elapsed(),
            stats.files_read,
            stats.metadata_hits,
            stats.fallbacks
        );
        stats
    }
}

impl CaptureTimeReader for ExtractionService {
    fn read_capture_time(&self, path: &Path) -> Option<DateTime<Local>> {
        self.files_read.fetch_add(1, Ordering::SeqCst);
        let result = match format_family(path) {
            FormatFamily::Raster => read_container_capture_time(path),
            FormatFamily::Raw => read_raw_capture_time(path),
        };
        match result {
            Ok(Some(timestamp)) => {
                self.metadata_hits.fetch_add(1, Ordering::SeqCst);
                Some(timestamp)
            }
            Ok(None) => {
                log::debug!("no capture time in {}", path.display());
                self.fallbacks.fetch_add(1, Ordering::SeqCst);
                None
            }
            Err(error) => {
                log::debug!("metadata read failed for {}: {}", path.display(), error);
                self.fallbacks.fetch_add(1, Ordering::SeqCst);
                None
            }
        }
    }
}

fn read_container_capture_time(path: &Path) -> Result<Option<DateTime<Local>>, String> {
    let file = fs::File::open(path).map_err(|e| format!("open failed: {}", e))?;
    let mut reader = BufReader::new(file);
    match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Ok(capture_time_from_exif(&exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(error) => Err(error.to_string()),
    }
}

fn read_raw_capture_time(path: &Path) -> Result<Option<DateTime<Local>>, String> {
    let data = fs::read(path).map_err(|e| format!("read failed: {}", e))?;
    match Reader::new().read_raw(data) {
        Ok(exif) => Ok(capture_time_from_exif(&exif)),
        Err(exif::Error::NotFound(_)) => Ok(None),
        Err(error) => Err(error.to_string()),
    }
}

fn capture_time_from_exif(exif: &Exif) -> Option<DateTime<Local>> {
    for tag in CAPTURE_TAGS {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        // Raw ASCII bytes; display_value() would wrap the string in quotes.
        if let Value::Ascii(ref vec) = field.value {
            if let Some(parsed) = vec
                .first()
                .and_then(|bytes| std::str::from_utf8(bytes).ok())
                .and_then(parse_exif_datetime)
            {
                return Some(parsed);
            }
        }
    }
    None
}

/// Parses `YYYY:MM:DD HH:MM:SS` as local time. Zeroed placeholder dates that
/// some cameras write are rejected.
pub fn parse_exif_datetime(value: &str) -> Option<DateTime<Local>> {
    let trimmed = value.trim().trim_matches('\0').trim_matches('"');
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y:%m:%d %H:%M:%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .or_else(|| Local.from_local_datetime(&naive).earliest())
}
