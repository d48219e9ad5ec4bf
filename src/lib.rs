pub mod capture_time;
pub mod error;
pub mod file_collect;
pub mod fs_atomic;
pub mod inventory;
pub mod model;
pub mod path_norm;
pub mod rename;
pub mod settings;
pub mod spreadsheet;

use crate::error::AppError;
use crate::model::{
    AppSettings, FailurePolicy, InspectResponse, PreviewStatus, RenamePreviewResponse,
    RenameReport, RenameRequest,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shotlist-renamer",
    version,
    about = "Rename a folder of photos, in capture order, after the rows of a CSV shot list"
)]
struct Cli {
    /// Settings file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the images of a folder in capture order
    Inspect {
        folder: String,
        #[arg(long)]
        json: bool,
    },
    /// Show which file would get which name, without renaming
    Preview {
        #[arg(long, value_name = "FILE")]
        csv: String,
        #[arg(long, value_name = "DIR")]
        folder: String,
        #[arg(long)]
        json: bool,
    },
    /// Rename the images after the spreadsheet rows
    Rename {
        #[arg(long, value_name = "FILE")]
        csv: String,
        #[arg(long, value_name = "DIR")]
        folder: String,
        /// Stop at the first failed rename instead of continuing
        #[arg(long)]
        abort_on_failure: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show or create the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective settings as JSON
    Show,
    /// Write the default settings to the settings file
    Init {
        #[arg(long)]
        force: bool,
    },
}

pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(code) => code,
        Err(error) => {
            log::error!("{}", error);
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode, AppError> {
    let Cli { config, command } = cli;
    let load_settings = || settings::load_settings(config.as_deref());

    match command {
        Command::Inspect { folder, json } => {
            let response = inventory::inspect(&folder, &load_settings()?)?;
            if json {
                print_json(&response)?;
            } else {
                print_inspect(&response);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Preview { csv, folder, json } => {
            let request = RenameRequest {
                folder_path: folder,
                spreadsheet_path: csv,
            };
            let response = rename::preview(&request, &load_settings()?)?;
            if json {
                print_json(&response)?;
            } else {
                print_preview(&response);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Rename {
            csv,
            folder,
            abort_on_failure,
            json,
        } => {
            let request = RenameRequest {
                folder_path: folder,
                spreadsheet_path: csv,
            };
            let mut settings = load_settings()?;
            if abort_on_failure {
                settings.failure_policy = FailurePolicy::Abort;
            }
            let report = rename::execute(
                &request,
                &settings,
                || false,
                |event| {
                    if let Some(path) = event.current_path.as_deref() {
                        log::debug!("[{}/{}] {}", event.processed, event.total, path);
                    }
                },
            )?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
            Ok(if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Config {
            action: ConfigAction::Show,
        } => {
            print_json(&load_settings()?)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config {
            action: ConfigAction::Init { force },
        } => init_settings(config.clone(), force),
    }
}

fn init_settings(explicit: Option<PathBuf>, force: bool) -> Result<ExitCode, AppError> {
    let path = match explicit {
        Some(path) => path,
        None => settings::settings_file_path()?,
    };
    if path.exists() && !force {
        return Err(AppError::Settings(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    settings::save_settings(&path, &AppSettings::default())?;
    println!("wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(value).map_err(|e| AppError::Io(e.to_string()))?;
    println!("{}", body);
    Ok(())
}

fn print_inspect(response: &InspectResponse) {
    for (position, image) in response.images.iter().enumerate() {
        println!(
            "{:>4}  {}  {:<9}  {}",
            position + 1,
            image.capture_timestamp.format("%Y-%m-%d %H:%M:%S"),
            format!("{:?}", image.timestamp_source).to_lowercase(),
            image.original_name
        );
    }
    let types: Vec<String> = response
        .summary
        .file_types
        .iter()
        .map(|(ext, count)| format!("{} {}", count, ext))
        .collect();
    println!(
        "{} images in {} ({})",
        response.summary.image_count,
        response.summary.folder_path,
        types.join(", ")
    );
}

fn print_preview(response: &RenamePreviewResponse) {
    for item in &response.items {
        let destination = item.destination_path.as_deref().unwrap_or("-");
        match item.status {
            PreviewStatus::Ready => println!(
                "{:>4}  row {:<4} {} -> {}",
                item.index + 1,
                item.row_number,
                item.source_path,
                destination
            ),
            PreviewStatus::Conflict => println!(
                "{:>4}  row {:<4} {} -> {}  [conflict: {}]",
                item.index + 1,
                item.row_number,
                item.source_path,
                destination,
                item.reason.as_deref().unwrap_or("unknown")
            ),
        }
    }
    println!(
        "{} images, {} usable rows, {} pairs ({} ready, {} conflicts)",
        response.image_count,
        response.valid_row_count,
        response.paired_count,
        response.ready,
        response.conflicts
    );
}

fn print_report(report: &RenameReport) {
    for failure in &report.failures {
        println!(
            "failed #{} {}: {}",
            failure.index + 1,
            failure.path,
            failure.reason
        );
    }
    println!("{}", report.message);
}
