use thiserror::Error;

use gps_ingest::IngestError;

/// Errors that stop a canonicalization run.
///
/// Row-level problems never show up here; they become warnings on the
/// affected row.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("duplicate header {header:?} at columns {first} and {second}")]
    DuplicateHeader {
        header: String,
        first: usize,
        second: usize,
    },

    #[error("report has {rows} data rows, more than the limit of {limit}")]
    ResourceExhausted { rows: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
