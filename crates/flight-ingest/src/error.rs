//! Ingestion error types

use flight_core::CoreError;
use thiserror::Error;

/// Errors from reading a flight feed
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Trajectory error: {0}")]
    Core(#[from] CoreError),
}

impl IngestError {
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
