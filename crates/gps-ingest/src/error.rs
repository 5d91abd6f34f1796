//! Error types for GPS report ingestion.

use thiserror::Error;

/// Errors that can occur while turning uploaded bytes into rows.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Format Errors ===
    /// Declared format is neither delimited text nor a spreadsheet.
    #[error("unsupported report format: {format}")]
    UnsupportedFormat { format: String },

    /// Input exceeds the size cutoff.
    #[error("report is {size} bytes, limit is {limit}")]
    FileTooLarge { size: usize, limit: usize },

    /// UTF-16 encoded text is not supported.
    #[error("unsupported text encoding: {encoding}")]
    UnsupportedEncoding { encoding: &'static str },

    // === Parsing Errors ===
    /// Failed to read delimited text.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to open or read a workbook.
    #[error("failed to read spreadsheet: {message}")]
    Spreadsheet { message: String },

    /// Workbook has no worksheets.
    #[error("spreadsheet has no worksheets")]
    NoWorksheet,
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::UnsupportedFormat {
            format: "pdf".to_string(),
        };
        assert_eq!(err.to_string(), "unsupported report format: pdf");

        let err = IngestError::FileTooLarge { size: 10, limit: 5 };
        assert!(err.to_string().contains("limit is 5"));
    }
}
