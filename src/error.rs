use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("Spreadsheet error: {0}")]
    Sheet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    // A single source file failed; callers usually record it and keep going.
    #[error("Failed to read {path}: {message}")]
    Source { path: String, message: String },
}

impl From<calamine::Error> for ReportError {
    fn from(err: calamine::Error) -> Self {
        ReportError::Sheet(err.to_string())
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(err: toml::de::Error) -> Self {
        ReportError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
