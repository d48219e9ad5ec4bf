mod common;

use common::{jpeg_with_datetime_original, write_csv, write_with_mtime};
use shotlist_renamer_lib::error::AppError;
use shotlist_renamer_lib::model::{
    AppSettings, ExecuteStatus, FailurePolicy, PreviewStatus, RenameReport, RenameRequest,
};
use shotlist_renamer_lib::rename;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn request(folder: &Path, csv: &Path) -> RenameRequest {
    RenameRequest {
        folder_path: folder.to_string_lossy().to_string(),
        spreadsheet_path: csv.to_string_lossy().to_string(),
    }
}

fn execute(request: &RenameRequest, settings: &AppSettings) -> RenameReport {
    rename::execute(request, settings, || false, |_| {}).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn earliest_images_take_the_rows_and_the_latest_is_left_alone() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "A.jpg", b"A", 3_000);
    write_with_mtime(photos.path(), "B.jpg", b"B", 1_000);
    write_with_mtime(photos.path(), "C.jpg", b"C", 1_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName,Caption\nX,first\nY,second\n");

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());

    assert!(report.success);
    assert_eq!(report.succeeded_count, 2);
    assert_eq!(report.image_count, 3);
    assert_eq!(report.paired_count, 2);
    assert_eq!(fs::read(photos.path().join("X.jpg")).unwrap(), b"B");
    assert_eq!(fs::read(photos.path().join("Y.jpg")).unwrap(), b"C");
    assert_eq!(fs::read(photos.path().join("A.jpg")).unwrap(), b"A");
    assert_eq!(listing(photos.path()), vec!["A.jpg", "X.jpg", "Y.jpg"]);
}

#[test]
fn more_rows_than_images_is_not_an_error() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    for (i, name) in ["p1.jpg", "p2.jpg", "p3.jpg"].iter().enumerate() {
        write_with_mtime(photos.path(), name, b"x", 1_000 + i as i64);
    }
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nR1\nR2\nR3\nR4\nR5\n");

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());

    assert!(report.success);
    assert!(report.succeeded_count <= 3);
    assert_eq!(report.succeeded_count, 3);
    assert_eq!(report.valid_row_count, 5);
    assert!(report.message.contains("2 rows had no matching image"));
    assert_eq!(listing(photos.path()), vec!["R1.jpg", "R2.jpg", "R3.jpg"]);
}

#[test]
fn blank_rows_receive_no_image() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "p1.jpg", b"1", 1_000);
    write_with_mtime(photos.path(), "p2.jpg", b"2", 2_000);
    let csv = write_csv(
        sheets.path(),
        "shots.csv",
        "FileName,Note\n,orphan note\n,\nOpening,\n  ,  \nClosing,end\n,\n",
    );

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());

    assert_eq!(report.valid_row_count, 2);
    assert_eq!(fs::read(photos.path().join("Opening.jpg")).unwrap(), b"1");
    assert_eq!(fs::read(photos.path().join("Closing.jpg")).unwrap(), b"2");
}

#[test]
fn capture_metadata_drives_the_order() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    // Touched recently, shot long ago.
    write_with_mtime(
        photos.path(),
        "late_copy.jpg",
        &jpeg_with_datetime_original("2001:05:06 07:08:09"),
        1_900_000_000,
    );
    write_with_mtime(photos.path(), "plain.jpg", b"plain", 1_500_000_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nFirst\nSecond\n");

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());

    assert!(report.success);
    assert!(photos.path().join("Second.jpg").exists());
    assert_eq!(fs::read(photos.path().join("Second.jpg")).unwrap(), b"plain");
}

#[test]
fn existing_target_is_recorded_and_later_pairs_continue() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "a.jpg", b"a", 1_000);
    write_with_mtime(photos.path(), "X.jpg", b"old X", 2_000);
    write_with_mtime(photos.path(), "c.jpg", b"c", 3_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nX\nY\nZ\n");

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());

    assert!(!report.success);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 0);
    assert!(report.failures[0].path.ends_with("a.jpg"));
    assert!(report.failures[0].reason.contains("already exists"));
    assert_eq!(report.succeeded_count, 2);
    assert_eq!(fs::read(photos.path().join("Y.jpg")).unwrap(), b"old X");
    assert_eq!(fs::read(photos.path().join("Z.jpg")).unwrap(), b"c");
    assert_eq!(fs::read(photos.path().join("a.jpg")).unwrap(), b"a");
}

#[test]
fn abort_policy_halts_with_accurate_partial_counts() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "a.jpg", b"a", 1_000);
    write_with_mtime(photos.path(), "b.jpg", b"b", 2_000);
    write_with_mtime(photos.path(), "Keep.jpg", b"keep", 9_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nOne\nKeep\nThree\n");
    let settings = AppSettings {
        failure_policy: FailurePolicy::Abort,
        ..AppSettings::default()
    };

    let report = execute(&request(photos.path(), &csv), &settings);

    assert!(!report.success);
    assert_eq!(report.succeeded_count, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.details[2].status, ExecuteStatus::Skipped);
    assert_eq!(
        listing(photos.path()),
        vec!["Keep.jpg", "One.jpg", "b.jpg"]
    );
}

#[test]
fn preview_changes_nothing() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "a.jpg", b"a", 1_000);
    write_with_mtime(photos.path(), "b.jpg", b"b", 2_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nSame\nSame\n");

    let preview = rename::preview(&request(photos.path(), &csv), &AppSettings::default()).unwrap();

    assert_eq!(preview.paired_count, 2);
    assert_eq!(preview.items[0].status, PreviewStatus::Ready);
    assert_eq!(preview.items[1].status, PreviewStatus::Conflict);
    assert_eq!(listing(photos.path()), vec!["a.jpg", "b.jpg"]);
}

#[test]
fn input_and_parse_errors_come_before_any_rename() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "a.jpg", b"a", 1_000);
    let settings = AppSettings::default();

    let missing_csv = request(photos.path(), &sheets.path().join("missing.csv"));
    assert!(matches!(
        rename::execute(&missing_csv, &settings, || false, |_| {}),
        Err(AppError::Input(_))
    ));

    let missing_folder = request(
        &photos.path().join("nope"),
        &write_csv(sheets.path(), "ok.csv", "FileName\nX\n"),
    );
    assert!(matches!(
        rename::execute(&missing_folder, &settings, || false, |_| {}),
        Err(AppError::Input(_))
    ));

    let wrong_header = request(
        photos.path(),
        &write_csv(sheets.path(), "bad.csv", "Name\nX\n"),
    );
    assert!(matches!(
        rename::execute(&wrong_header, &settings, || false, |_| {}),
        Err(AppError::Parse(_))
    ));

    assert_eq!(listing(photos.path()), vec!["a.jpg"]);
}

#[test]
fn report_serializes_in_camel_case() {
    let photos = TempDir::new().unwrap();
    let sheets = TempDir::new().unwrap();
    write_with_mtime(photos.path(), "a.jpg", b"a", 1_000);
    let csv = write_csv(sheets.path(), "shots.csv", "FileName\nX\n");

    let report = execute(&request(photos.path(), &csv), &AppSettings::default());
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["succeededCount"], 1);
    assert!(value["failures"].as_array().unwrap().is_empty());
    assert!(value["message"].as_str().unwrap().starts_with("Renamed 1 of 1"));
}
