use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Declared content kind of an uploaded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Delimited text (comma, semicolon or tab).
    Csv,
    /// Any workbook calamine can open.
    Spreadsheet,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
        }
    }

    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" | "text/csv" => Ok(Self::Csv),
            "spreadsheet" | "excel" | "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => {
                Ok(Self::Spreadsheet)
            }
            _ => Err(IngestError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}
