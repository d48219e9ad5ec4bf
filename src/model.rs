use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimestampSource {
    Metadata,
    Modified,
    /// Neither metadata nor a filesystem stat was readable; the timestamp is the Unix epoch.
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub path: PathBuf,
    pub original_name: String,
    pub capture_timestamp: DateTime<Local>,
    pub timestamp_source: TimestampSource,
    /// Lowercase, including the leading dot.
    pub file_extension: String,
    pub size_bytes: u64,
    pub listing_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetRow {
    /// 1-based position among the data rows of the file (header excluded).
    pub row_number: usize,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub folder_path: String,
    pub spreadsheet_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummary {
    pub folder_path: String,
    pub image_count: usize,
    pub file_types: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    pub summary: FolderSummary,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PreviewStatus {
    Ready,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePreviewItem {
    pub index: usize,
    pub row_number: usize,
    pub source_path: String,
    pub destination_path: Option<String>,
    pub status: PreviewStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePreviewResponse {
    pub items: Vec<RenamePreviewItem>,
    pub image_count: usize,
    pub valid_row_count: usize,
    pub paired_count: usize,
    pub ready: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExecuteStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameExecuteDetail {
    pub index: usize,
    pub source_path: String,
    pub destination_path: Option<String>,
    pub status: ExecuteStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenameFailure {
    pub index: usize,
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    pub success: bool,
    pub succeeded_count: usize,
    pub failures: Vec<RenameFailure>,
    pub message: String,
    pub image_count: usize,
    pub valid_row_count: usize,
    pub paired_count: usize,
    pub skipped_count: usize,
    pub canceled: bool,
    pub details: Vec<RenameExecuteDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationProgressEvent {
    pub operation: String,
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub current_path: Option<String>,
    pub done: bool,
    pub canceled: bool,
}

/// What the executor does after a pair fails to rename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Record the failure and keep going with the next pair.
    #[default]
    Continue,
    /// Stop at the first failure; later pairs are reported as skipped.
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Extensions a rename run will pick up from the folder.
    pub rename_extensions: Vec<String>,
    /// Extensions listed by `inspect`; a superset covering more raw formats.
    pub inspect_extensions: Vec<String>,
    pub file_name_column: String,
    pub failure_policy: FailurePolicy,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            rename_extensions: ["jpg", "jpeg", "png", "arw"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            inspect_extensions: ["jpg", "jpeg", "png", "arw", "cr2", "nef"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            file_name_column: "FileName".to_string(),
            failure_policy: FailurePolicy::Continue,
        }
    }
}
