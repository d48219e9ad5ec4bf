use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("input error: {0}")]
    Input(String),
    #[error("spreadsheet error: {0}")]
    Parse(String),
    #[error("folder enumeration error: {0}")]
    Enumeration(String),
    #[error("settings error: {0}")]
    Settings(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Parse(value.to_string())
    }
}
