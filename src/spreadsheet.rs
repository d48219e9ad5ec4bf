use crate::error::AppError;
use crate::model::SpreadsheetRow;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

impl SpreadsheetRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// A row takes part in pairing only with a non-empty file name and at
    /// least one non-empty field. Blank trailing rows fail on the file name;
    /// a named row always has a non-empty field.
    pub fn is_valid(&self, file_name_column: &str) -> bool {
        let has_name = self
            .get(file_name_column)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        has_name && self.fields.iter().any(|(_, value)| !value.trim().is_empty())
    }
}

/// Reads a comma-separated file whose first row is the header.
pub fn parse_file(raw_path: &str, file_name_column: &str) -> Result<Vec<SpreadsheetRow>, AppError> {
    let path = resolve_spreadsheet(raw_path)?;
    let file = fs::File::open(&path).map_err(|e| {
        AppError::Input(format!("failed to open spreadsheet {}: {}", path.display(), e))
    })?;
    parse_reader(file, file_name_column)
}

pub fn resolve_spreadsheet(raw_path: &str) -> Result<PathBuf, AppError> {
    let trimmed = raw_path.trim();
    if trimmed.is_empty() {
        return Err(AppError::Input("no spreadsheet path given".to_string()));
    }
    let path = PathBuf::from(trimmed);
    if !path.is_file() {
        return Err(AppError::Input(format!("spreadsheet not found: {}", trimmed)));
    }
    Ok(path)
}

pub fn parse_reader<R: Read>(reader: R, file_name_column: &str) -> Result<Vec<SpreadsheetRow>, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if !headers.iter().any(|header| header == file_name_column) {
        return Err(AppError::Parse(format!(
            "spreadsheet has no `{}` column",
            file_name_column
        )));
    }

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let fields = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|value| value.trim().to_string()))
            .collect();
        rows.push(SpreadsheetRow {
            row_number: index + 1,
            fields,
        });
    }
    Ok(rows)
}

pub fn valid_rows(rows: Vec<SpreadsheetRow>, file_name_column: &str) -> Vec<SpreadsheetRow> {
    rows.into_iter()
        .filter(|row| row.is_valid(file_name_column))
        .collect()
}
