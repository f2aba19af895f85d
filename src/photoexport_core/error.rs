use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Photos library not found at {0}")]
    LibraryNotFound(PathBuf),

    #[error("Catalog database not found at {0}")]
    CatalogNotFound(PathBuf),

    // Catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] rusqlite::Error),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walker error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    // Metadata errors
    #[error("Exiftool error: {0}")]
    Exiftool(String),

    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),

    #[error("Preview conversion failed for {path}: {reason}")]
    Conversion { path: PathBuf, reason: String },

    // Cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] serde_json::Error),

    // User interaction
    #[error("Export cancelled by user")]
    Cancelled,
}

/// Result type for photoexport operations.
pub type Result<T> = std::result::Result<T, ExportError>;
