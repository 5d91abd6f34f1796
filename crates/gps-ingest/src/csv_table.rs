use csv::ReaderBuilder;
use tracing::warn;

use crate::error::{IngestError, Result};

const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];
const SNIFF_LINES: usize = 5;

/// Reads delimited text into a raw cell grid. Every cell is trimmed.
pub fn read_grid(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
        });
    }
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => std::borrow::Cow::Borrowed(text),
        Err(_) => {
            warn!("report is not valid UTF-8, invalid sequences replaced");
            String::from_utf8_lossy(bytes)
        }
    };
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(normalize_cell).collect());
    }
    Ok(grid)
}

pub(crate) fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

/// Picks the candidate delimiter that occurs most often, outside quotes, over
/// the first few non-blank lines. Ties and no hits fall back to a comma.
fn sniff_delimiter(text: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    for line in text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
    {
        let mut in_quotes = false;
        for byte in line.bytes() {
            if byte == b'"' {
                in_quotes = !in_quotes;
                continue;
            }
            if in_quotes {
                continue;
            }
            if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
                counts[idx] += 1;
            }
        }
    }
    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    CANDIDATE_DELIMITERS[best]
}
