use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the budget dashboard crates.
///
/// The analytics pipeline itself is infallible by design (bad cells degrade
/// to zero, bad dates to "no date"); these variants cover the fallible
/// boundary where the payload document is read from the backing store.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The payload file could not be opened or read from disk.
    #[error("Failed to read payload file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The payload document could not be parsed as JSON.
    #[error("Failed to parse payload JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The expected payload file does not exist.
    #[error("Payload file not found: {0}")]
    PayloadNotFound(PathBuf),

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
