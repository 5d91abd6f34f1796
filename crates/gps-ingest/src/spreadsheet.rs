use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::error::{IngestError, Result};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reads the first worksheet of a workbook into a raw cell grid.
pub fn read_grid(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
        IngestError::Spreadsheet {
            message: e.to_string(),
        }
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)?
        .map_err(|e| IngestError::Spreadsheet {
            message: e.to_string(),
        })?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(render_cell).collect())
        .collect())
}

/// Renders a workbook cell the way it would appear in a CSV export.
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => crate::csv_table::normalize_cell(text),
        Data::Float(value) => format_numeric(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            if value.is_duration() || (0.0..1.0).contains(&serial) {
                clock_from_days(serial)
            } else {
                format_numeric(serial)
            }
        }
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.trim().to_string(),
        Data::Error(error) => error.to_string(),
    }
}

/// Formats a float without a trailing `.0`.
pub fn format_numeric(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Fraction-of-day serial to `h:mm:ss`.
fn clock_from_days(days: f64) -> String {
    let total = (days * SECONDS_PER_DAY).round().max(0.0) as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_cells() {
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::Float(5400.0)), "5400");
        assert_eq!(render_cell(&Data::Float(28.80)), "28.8");
        assert_eq!(render_cell(&Data::Int(7)), "7");
        assert_eq!(render_cell(&Data::String("  J. Smith ".to_string())), "J. Smith");
    }

    #[test]
    fn renders_day_fractions_as_clock_text() {
        assert_eq!(clock_from_days(0.0625), "1:30:00");
        assert_eq!(clock_from_days(1.0 / 48.0 + 1.0 / 86_400.0), "0:30:01");
    }

    #[test]
    fn garbage_bytes_are_a_spreadsheet_error() {
        let err = read_grid(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, IngestError::Spreadsheet { .. }));
    }
}
