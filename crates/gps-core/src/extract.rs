//! Reading one mapped cell into a canonical value.

use gps_ingest::{SourceFormat, is_placeholder};
use gps_map::split_unit_suffix;
use gps_model::{CanonicalMetric, ColumnMapping, Dimension};
use gps_standards::{UnitError, UnitTable};

/// Largest spreadsheet value in a `%` column still read as a fraction.
/// Percent-formatted workbook cells hold 0.125 for "12.5%".
const FRACTION_CEILING: f64 = 1.1;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Absent,
    Value(f64),
    Malformed(UnitError),
}

/// Unit the column's values are written in.
///
/// The profile's declared unit wins, then a unit in the header text, then
/// the metric's canonical unit.
pub fn source_unit<'a>(
    column: &'a ColumnMapping,
    metric: &'a CanonicalMetric,
    units: &UnitTable,
) -> &'a str {
    if let Some(unit) = column.source_unit.as_deref() {
        return unit;
    }
    let (_, hint) = split_unit_suffix(&column.mapped_column);
    hint.filter(|hint| units.resolve(metric.dimension, hint).is_some())
        .unwrap_or(&metric.canonical_unit)
}

/// Parses `cell` in `unit` and converts it to the metric's canonical unit.
///
/// Workbooks store percent-formatted cells as fractions, so a bare spreadsheet
/// value up to [`FRACTION_CEILING`] in a `%` column is read as a ratio.
pub fn read_cell(
    cell: &str,
    unit: &str,
    metric: &CanonicalMetric,
    units: &UnitTable,
    format: SourceFormat,
) -> CellValue {
    if is_placeholder(cell) {
        return CellValue::Absent;
    }
    let converted = units.parse_value(cell, unit, metric.dimension).and_then(|value| {
        let from = if is_stored_fraction(cell, value, unit, metric, units, format) {
            "ratio"
        } else {
            unit
        };
        units.convert(value, from, &metric.canonical_unit, metric.dimension)
    });
    match converted {
        Ok(value) => CellValue::Value(value),
        Err(err) => CellValue::Malformed(err),
    }
}

fn is_stored_fraction(
    cell: &str,
    value: f64,
    unit: &str,
    metric: &CanonicalMetric,
    units: &UnitTable,
    format: SourceFormat,
) -> bool {
    format == SourceFormat::Spreadsheet
        && metric.dimension == Dimension::Ratio
        && units
            .resolve(Dimension::Ratio, unit)
            .is_some_and(|def| def.code == "%")
        && !cell.trim_end().ends_with('%')
        && value.abs() <= FRACTION_CEILING
}

#[cfg(test)]
mod tests {
    use gps_standards::MetricRegistry;

    use super::*;

    #[test]
    fn placeholders_read_as_absent() {
        let units = UnitTable::standard();
        let registry = MetricRegistry::load_default(&units).unwrap();
        let distance = registry.lookup("total_distance").unwrap();
        for cell in ["", "  ", "-", "N/A", "null", "—"] {
            assert_eq!(
                read_cell(cell, "m", distance, &units, SourceFormat::Csv),
                CellValue::Absent,
                "{cell:?}"
            );
        }
    }

    #[test]
    fn unit_falls_back_to_header_then_canonical() {
        let units = UnitTable::standard();
        let registry = MetricRegistry::load_default(&units).unwrap();
        let speed = registry.lookup("max_speed").unwrap();

        let mut column = ColumnMapping::new("Max Speed (km/h)");
        assert_eq!(source_unit(&column, speed, &units), "km/h");
        column.source_unit = Some("mph".to_string());
        assert_eq!(source_unit(&column, speed, &units), "mph");
        let plain = ColumnMapping::new("Vmax");
        assert_eq!(source_unit(&plain, speed, &units), "m/s");

        assert_eq!(
            read_cell("28,8", "km/h", speed, &units, SourceFormat::Csv),
            CellValue::Value(8.0)
        );
        assert!(matches!(
            read_cell("fast", "km/h", speed, &units, SourceFormat::Csv),
            CellValue::Malformed(_)
        ));
    }

    #[test]
    fn spreadsheet_percent_cells_stored_as_fractions() {
        let units = UnitTable::standard();
        let registry = MetricRegistry::load_default(&units).unwrap();
        let hsr = registry.lookup("hsr_percentage").unwrap();
        let read = |cell: &str, format: SourceFormat| {
            match read_cell(cell, "%", hsr, &units, format) {
                CellValue::Value(value) => value,
                other => panic!("{cell}: {other:?}"),
            }
        };

        assert!((read("0.125", SourceFormat::Spreadsheet) - 12.5).abs() < 1e-9);
        assert!((read("1", SourceFormat::Spreadsheet) - 100.0).abs() < 1e-9);
        assert!((read("12.5", SourceFormat::Spreadsheet) - 12.5).abs() < 1e-9);
        assert!((read("0.5%", SourceFormat::Spreadsheet) - 0.5).abs() < 1e-9);
        assert!((read("0.125", SourceFormat::Csv) - 0.125).abs() < 1e-9);
    }
}
