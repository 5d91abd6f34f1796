use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::format::SourceFormat;
use crate::placeholder::is_placeholder;
use crate::summary::is_summary_label;
use crate::{csv_table, spreadsheet};

/// Size cutoff for a single uploaded report.
pub const MAX_REPORT_BYTES: usize = 50 * 1024 * 1024;

/// Header row plus data rows of an uploaded report.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows dropped after the header because every cell was empty or a
    /// placeholder (`-`, `n/a`, ...).
    pub skipped_blank: usize,
    /// Aggregate rows ("Average", "Total", ...) dropped after the header.
    pub skipped_summary: usize,
}

/// Parses an uploaded report.
///
/// # Errors
///
/// Returns [`IngestError::FileTooLarge`] above [`MAX_REPORT_BYTES`], and
/// format-specific errors when the bytes cannot be read.
pub fn parse_report(bytes: &[u8], format: SourceFormat) -> Result<ParsedReport> {
    if bytes.len() > MAX_REPORT_BYTES {
        return Err(IngestError::FileTooLarge {
            size: bytes.len(),
            limit: MAX_REPORT_BYTES,
        });
    }
    let grid = match format {
        SourceFormat::Csv => csv_table::read_grid(bytes)?,
        SourceFormat::Spreadsheet => spreadsheet::read_grid(bytes)?,
    };
    let report = assemble(grid);
    debug!(
        format = %format,
        columns = report.headers.len(),
        rows = report.rows.len(),
        skipped_blank = report.skipped_blank,
        skipped_summary = report.skipped_summary,
        "report parsed"
    );
    Ok(report)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

fn non_empty_cells(row: &[String]) -> usize {
    row.iter().filter(|cell| !cell.trim().is_empty()).count()
}

/// Picks the header row: the first row with at least two filled cells, so
/// vendor title lines ("Session report", "Date: ...") are skipped. Falls back
/// to the first non-blank row for single-column files.
fn detect_header_row(grid: &[Vec<String>]) -> Option<usize> {
    grid.iter()
        .position(|row| non_empty_cells(row) >= 2)
        .or_else(|| grid.iter().position(|row| !is_blank(row)))
}

fn normalize_header(raw: &str, position: usize) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        format!("Column {}", position + 1)
    } else {
        collapsed
    }
}

pub(crate) fn assemble(grid: Vec<Vec<String>>) -> ParsedReport {
    let Some(header_index) = detect_header_row(&grid) else {
        return ParsedReport::default();
    };
    let mut grid = grid.into_iter().skip(header_index);
    let header_row = grid.next().unwrap_or_default();
    let width = header_row
        .iter()
        .rposition(|cell| !cell.trim().is_empty())
        .map_or(0, |last| last + 1);
    let headers: Vec<String> = (0..width)
        .map(|idx| normalize_header(header_row.get(idx).map_or("", String::as_str), idx))
        .collect();

    let mut report = ParsedReport {
        headers,
        ..ParsedReport::default()
    };
    for mut row in grid {
        row.resize(width, String::new());
        if row.iter().all(|cell| is_placeholder(cell)) {
            report.skipped_blank += 1;
            continue;
        }
        if row.first().is_some_and(|cell| is_summary_label(cell)) {
            report.skipped_summary += 1;
            continue;
        }
        report.rows.push(row);
    }
    report
}
