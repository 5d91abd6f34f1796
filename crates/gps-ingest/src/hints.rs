//! Per-column statistics used by the mapping heuristics.

use std::collections::BTreeMap;

use gps_model::ColumnHint;

use crate::report::ParsedReport;

fn looks_numeric(value: &str) -> bool {
    let compact = value.replace(',', ".").replace(['%', ' '], "");
    if compact.parse::<f64>().is_ok() {
        return true;
    }
    compact.contains(':')
        && compact
            .split(':')
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit() || ch == '.'))
}

pub fn build_column_hints(report: &ParsedReport) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = report.rows.len();
    for (col_idx, header) in report.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        for row in &report.rows {
            let value = row.get(col_idx).map_or("", String::as_str).trim();
            if value.is_empty() {
                continue;
            }
            non_null += 1;
            if looks_numeric(value) {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            row_count.saturating_sub(non_null) as f64 / row_count as f64
        };
        hints.entry(header.clone()).or_insert(ColumnHint {
            is_numeric: non_null > 0 && numeric == non_null,
            null_ratio,
        });
    }
    hints
}
