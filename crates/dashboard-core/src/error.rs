use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the listings dashboard.
///
/// Row-level data problems are never reported through this type: invalid rows
/// are dropped at ingestion and unknown selectors produce empty results.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be read.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A sort or display column is not one of the recognised table columns.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A month selector did not match the `YYYY-MM` format.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// A chart kind string is not `price` or `rating`.
    #[error("Invalid series kind: {0}")]
    InvalidSeriesKind(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
