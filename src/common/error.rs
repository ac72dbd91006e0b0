use std::path::PathBuf;
use thiserror::Error;

use crate::domain::InstId;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No institution registered with ID {0}")]
    NotFoundInstitution(InstId),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Attempt denied. Data are not cleaned yet.")]
    PreconditionNotMet,

    #[error("No directory named {}", .0.display())]
    MissingSourceDirectory(PathBuf),

    #[error("Malformed source file {}: {reason}", path.display())]
    MalformedSourceFile { path: PathBuf, reason: String },

    #[error("No placements recorded for field {0}")]
    EmptyDistribution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet read failed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Spreadsheet write failed: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
