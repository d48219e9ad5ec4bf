use crate::capture_time::ExtractionService;
use crate::error::AppError;
use crate::file_collect::resolve_folder;
use crate::fs_atomic::{is_case_only_self_rename, move_without_replace};
use crate::inventory;
use crate::model::{
    AppSettings, ExecuteStatus, FailurePolicy, ImageRecord, OperationProgressEvent,
    PreviewStatus, RenameExecuteDetail, RenameFailure, RenamePreviewItem, RenamePreviewResponse,
    RenameReport, RenameRequest, SpreadsheetRow,
};
use crate::path_norm::path_key;
use crate::spreadsheet;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PlannedRename {
    pub index: usize,
    pub source: PathBuf,
    pub row_number: usize,
    /// `None` when the row's file name sanitizes to nothing usable.
    pub destination: Option<PathBuf>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub folder: PathBuf,
    pub image_count: usize,
    pub valid_row_count: usize,
    pub entries: Vec<PlannedRename>,
}

/// Pairs the i-th image with the i-th row. Whichever side is longer has its
/// tail left out of the plan.
pub fn pair(
    folder: &Path,
    images: &[ImageRecord],
    valid_rows: &[SpreadsheetRow],
    file_name_column: &str,
) -> RenamePlan {
    let entries = images
        .iter()
        .zip(valid_rows.iter())
        .enumerate()
        .map(|(index, (image, row))| {
            let requested = row.get(file_name_column).unwrap_or("");
            let safe_name = sanitize_file_name(requested);
            let (destination, reason) = if safe_name.is_empty() {
                (
                    None,
                    Some(format!("`{}` is not a usable file name", requested)),
                )
            } else {
                (
                    Some(folder.join(with_source_extension(&safe_name, &image.path))),
                    None,
                )
            };
            PlannedRename {
                index,
                source: image.path.clone(),
                row_number: row.row_number,
                destination,
                reason,
            }
        })
        .collect();

    RenamePlan {
        folder: folder.to_path_buf(),
        image_count: images.len(),
        valid_row_count: valid_rows.len(),
        entries,
    }
}

/// Resolves both inputs, parses the spreadsheet, builds the inventory and pairs them.
/// Nothing on disk changes here.
pub fn build_plan(request: &RenameRequest, settings: &AppSettings) -> Result<RenamePlan, AppError> {
    let folder = resolve_folder(&request.folder_path)?;
    spreadsheet::resolve_spreadsheet(&request.spreadsheet_path)?;

    let rows = spreadsheet::parse_file(&request.spreadsheet_path, &settings.file_name_column)?;
    let row_count = rows.len();
    let valid_rows = spreadsheet::valid_rows(rows, &settings.file_name_column);
    log::debug!(
        "{} of {} spreadsheet rows are usable",
        valid_rows.len(),
        row_count
    );

    let service = ExtractionService::open();
    let images = inventory::build(&folder, &settings.rename_extensions, &service);
    service.close();
    let images = images?;

    Ok(pair(&folder, &images, &valid_rows, &settings.file_name_column))
}

pub fn preview(
    request: &RenameRequest,
    settings: &AppSettings,
) -> Result<RenamePreviewResponse, AppError> {
    let plan = build_plan(request, settings)?;
    Ok(preview_plan(&plan))
}

/// Flags the entries that would fail if executed now. Targets occupied by a
/// file that an earlier entry moves away count as free.
pub fn preview_plan(plan: &RenamePlan) -> RenamePreviewResponse {
    let mut planned_keys: HashSet<String> = HashSet::new();
    let mut vacated: HashMap<String, Vec<PathBuf>> = HashMap::new();
    let mut ready = 0usize;
    let mut conflicts = 0usize;

    let items = plan
        .entries
        .iter()
        .map(|item| {
            let (status, reason) = match item.destination.as_ref() {
                None => (PreviewStatus::Conflict, item.reason.clone()),
                Some(destination) => {
                    let key = path_key(destination);
                    let occupant_moves_away = vacated.get(&key).map_or(false, |sources| {
                        sources.iter().any(|source| {
                            source == destination || is_case_only_self_rename(source, destination)
                        })
                    });
                    if planned_keys.contains(&key) {
                        (
                            PreviewStatus::Conflict,
                            Some("same target as an earlier row".to_string()),
                        )
                    } else if item.source == *destination {
                        (PreviewStatus::Ready, Some("already named".to_string()))
                    } else if destination.exists()
                        && !is_case_only_self_rename(&item.source, destination)
                        && !occupant_moves_away
                    {
                        (
                            PreviewStatus::Conflict,
                            Some("target already exists".to_string()),
                        )
                    } else {
                        (PreviewStatus::Ready, None)
                    }
                }
            };

            match status {
                PreviewStatus::Ready => {
                    ready += 1;
                    if let Some(destination) = item.destination.as_ref() {
                        planned_keys.insert(path_key(destination));
                    }
                    vacated
                        .entry(path_key(&item.source))
                        .or_default()
                        .push(item.source.clone());
                }
                PreviewStatus::Conflict => conflicts += 1,
            }

            RenamePreviewItem {
                index: item.index,
                row_number: item.row_number,
                source_path: item.source.to_string_lossy().to_string(),
                destination_path: item
                    .destination
                    .as_ref()
                    .map(|path| path.to_string_lossy().to_string()),
                status,
                reason,
            }
        })
        .collect();

    RenamePreviewResponse {
        items,
        image_count: plan.image_count,
        valid_row_count: plan.valid_row_count,
        paired_count: plan.entries.len(),
        ready,
        conflicts,
    }
}

pub fn execute<FCancel, FProgress>(
    request: &RenameRequest,
    settings: &AppSettings,
    is_cancelled: FCancel,
    report_progress: FProgress,
) -> Result<RenameReport, AppError>
where
    FCancel: Fn() -> bool,
    FProgress: FnMut(OperationProgressEvent),
{
    let plan = build_plan(request, settings)?;
    Ok(execute_plan(
        &plan,
        settings.failure_policy,
        is_cancelled,
        report_progress,
    ))
}

/// Runs the plan one pair at a time in pairing order. Every pair ends up in
/// `details`; failed pairs also land in `failures`.
pub fn execute_plan<FCancel, FProgress>(
    plan: &RenamePlan,
    policy: FailurePolicy,
    is_cancelled: FCancel,
    mut report_progress: FProgress,
) -> RenameReport
where
    FCancel: Fn() -> bool,
    FProgress: FnMut(OperationProgressEvent),
{
    let total = plan.entries.len();
    let mut details = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut succeeded = 0usize;
    let mut skipped = 0usize;
    let mut processed = 0usize;
    let mut canceled = false;
    let mut halted = false;

    for item in &plan.entries {
        if !canceled && is_cancelled() {
            canceled = true;
            log::info!("cancel requested after {} of {} renames", processed, total);
        }

        let detail = if canceled {
            skipped_detail(item, "canceled")
        } else if halted {
            skipped_detail(item, "not attempted after an earlier failure")
        } else {
            execute_one_rename(item)
        };

        processed += 1;
        match detail.status {
            ExecuteStatus::Succeeded => succeeded += 1,
            ExecuteStatus::Failed => {
                let reason = detail.reason.clone().unwrap_or_default();
                log::warn!("rename #{} failed for {}: {}", item.index, detail.source_path, reason);
                failures.push(RenameFailure {
                    index: item.index,
                    path: detail.source_path.clone(),
                    reason,
                });
                if policy == FailurePolicy::Abort {
                    halted = true;
                }
            }
            ExecuteStatus::Skipped => skipped += 1,
        }

        let current_path = Some(detail.source_path.clone());
        details.push(detail);
        report_progress(OperationProgressEvent {
            operation: "rename".to_string(),
            processed,
            total,
            succeeded,
            failed: failures.len(),
            skipped,
            current_path,
            done: false,
            canceled,
        });
    }

    report_progress(OperationProgressEvent {
        operation: "rename".to_string(),
        processed,
        total,
        succeeded,
        failed: failures.len(),
        skipped,
        current_path: None,
        done: true,
        canceled,
    });

    let message = summary_message(plan, succeeded, failures.len(), skipped, canceled, halted);
    log::info!("{}", message);

    RenameReport {
        success: failures.is_empty(),
        succeeded_count: succeeded,
        failures,
        message,
        image_count: plan.image_count,
        valid_row_count: plan.valid_row_count,
        paired_count: total,
        skipped_count: skipped,
        canceled,
        details,
    }
}

fn execute_one_rename(item: &PlannedRename) -> RenameExecuteDetail {
    let source_path = item.source.to_string_lossy().to_string();
    let Some(destination) = item.destination.as_ref() else {
        return RenameExecuteDetail {
            index: item.index,
            source_path,
            destination_path: None,
            status: ExecuteStatus::Failed,
            reason: item
                .reason
                .clone()
                .or_else(|| Some("no target name".to_string())),
        };
    };

    let destination_path = Some(destination.to_string_lossy().to_string());
    match move_without_replace(&item.source, destination) {
        Ok(note) => RenameExecuteDetail {
            index: item.index,
            source_path,
            destination_path,
            status: ExecuteStatus::Succeeded,
            reason: note,
        },
        Err(error) => RenameExecuteDetail {
            index: item.index,
            source_path,
            destination_path,
            status: ExecuteStatus::Failed,
            reason: Some(error),
        },
    }
}

fn skipped_detail(item: &PlannedRename, reason: &str) -> RenameExecuteDetail {
    RenameExecuteDetail {
        index: item.index,
        source_path: item.source.to_string_lossy().to_string(),
        destination_path: item
            .destination
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        status: ExecuteStatus::Skipped,
        reason: Some(reason.to_string()),
    }
}

fn summary_message(
    plan: &RenamePlan,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    canceled: bool,
    halted: bool,
) -> String {
    let paired = plan.entries.len();
    let mut message = format!("Renamed {} of {} paired files", succeeded, paired);
    if failed > 0 {
        message.push_str(&format!(", {} failed", failed));
    }
    if skipped > 0 {
        let why = if canceled {
            "canceled"
        } else if halted {
            "stopped after first failure"
        } else {
            "skipped"
        };
        message.push_str(&format!(", {} not attempted ({})", skipped, why));
    }
    if plan.image_count > paired {
        message.push_str(&format!(
            "; {} images had no matching row",
            plan.image_count - paired
        ));
    }
    if plan.valid_row_count > paired {
        message.push_str(&format!(
            "; {} rows had no matching image",
            plan.valid_row_count - paired
        ));
    }
    message
}

/// Appends the source file's extension as found on disk.
fn with_source_extension(name: &str, source: &Path) -> String {
    match source.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", name, ext),
        _ => name.to_string(),
    }
}

fn sanitize_file_name(value: &str) -> String {
    let invalid_chars = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
    let sanitized: String = value
        .chars()
        .map(|ch| {
            if invalid_chars.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();
    sanitized.trim().trim_matches('.').trim().to_string()
}
