use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the time-log pipeline.
#[derive(Error, Debug)]
pub enum TimelogError {
    /// The timestamp log could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank line is not an ISO-8601 timestamp with a UTC offset.
    #[error("Invalid timestamp on line {line}: {content:?}")]
    TimestampParse { line: usize, content: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report could not be serialised to JSON.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimelogError {
    /// Process exit code for this failure class (sysexits-style).
    pub fn exit_code(&self) -> u8 {
        match self {
            TimelogError::Config(_) => 64,
            TimelogError::TimestampParse { .. } => 65,
            TimelogError::FileRead { .. } => 66,
            _ => 1,
        }
    }
}

/// Convenience alias used throughout the timelog crates.
pub type Result<T> = std::result::Result<T, TimelogError>;
