use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a source from becoming a [`Table`](super::model::Table).
///
/// All variants are terminal for the current load; nothing is retried.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid record {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    /// Whether the error is the "missing input" case the UI reports specially.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::SourceNotFound(_))
    }
}
