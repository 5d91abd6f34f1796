//! Dimension & unit table and the unit conversion engine.
//!
//! Every unit is a linear scale factor onto its dimension's base unit (the
//! unit with factor 1). Clock units of the time dimension also have factor 1
//! (seconds) and additionally accept `h:mm:ss`-style text.

use std::collections::BTreeMap;

use gps_model::{CanonicalMetric, Dimension};

use crate::error::UnitError;

/// How two-part clock text is read. Three-part text is always `h:m:s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockLayout {
    HoursMinutesSeconds,
    HoursMinutes,
    MinutesSeconds,
}

/// One row of the unit table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
    pub code: &'static str,
    pub dimension: Dimension,
    /// Multiply a value in this unit by `factor` to get the base unit.
    pub factor: f64,
    pub aliases: &'static [&'static str],
    pub clock: Option<ClockLayout>,
    /// Decimal places used when rendering values in this unit.
    pub precision: usize,
}

const fn unit(
    code: &'static str,
    dimension: Dimension,
    factor: f64,
    aliases: &'static [&'static str],
    precision: usize,
) -> UnitDef {
    UnitDef {
        code,
        dimension,
        factor,
        aliases,
        clock: None,
        precision,
    }
}

const fn clock(code: &'static str, layout: ClockLayout) -> UnitDef {
    UnitDef {
        code,
        dimension: Dimension::Time,
        factor: 1.0,
        aliases: &[],
        clock: Some(layout),
        precision: 0,
    }
}

/// The standard catalog. The first unit of each dimension is its base.
const STANDARD_UNITS: &[UnitDef] = &[
    // Distance
    unit(
        "m",
        Dimension::Distance,
        1.0,
        &["meter", "meters", "metre", "metres", "м"],
        0,
    ),
    unit(
        "km",
        Dimension::Distance,
        1000.0,
        &["kilometer", "kilometers", "kilometre", "kilometres", "км"],
        2,
    ),
    unit("yd", Dimension::Distance, 0.9144, &["yard", "yards"], 0),
    unit("mi", Dimension::Distance, 1609.344, &["mile", "miles"], 2),
    unit("ft", Dimension::Distance, 0.3048, &["foot", "feet"], 0),
    // Time
    unit(
        "s",
        Dimension::Time,
        1.0,
        &["sec", "secs", "second", "seconds", "с", "сек"],
        0,
    ),
    unit("ms", Dimension::Time, 0.001, &["msec", "millisecond", "milliseconds"], 0),
    unit(
        "min",
        Dimension::Time,
        60.0,
        &["mins", "minute", "minutes", "мин"],
        1,
    ),
    unit("h", Dimension::Time, 3600.0, &["hr", "hrs", "hour", "hours", "ч"], 2),
    clock("hh:mm:ss", ClockLayout::HoursMinutesSeconds),
    clock("hh:mm", ClockLayout::HoursMinutes),
    clock("mm:ss", ClockLayout::MinutesSeconds),
    // Speed
    unit("m/s", Dimension::Speed, 1.0, &["mps", "m/sec", "м/с"], 2),
    unit(
        "km/h",
        Dimension::Speed,
        1.0 / 3.6,
        &["kmh", "kph", "km/hr", "kmph", "км/ч"],
        1,
    ),
    unit("m/min", Dimension::Speed, 1.0 / 60.0, &["mpm", "м/мин"], 0),
    unit("mph", Dimension::Speed, 0.44704, &["mi/h"], 1),
    unit("kn", Dimension::Speed, 1852.0 / 3600.0, &["knot", "knots", "kt"], 1),
    // Acceleration
    unit(
        "m/s^2",
        Dimension::Acceleration,
        1.0,
        &["m/s2", "m/s²", "mss", "м/с²"],
        2,
    ),
    unit("g", Dimension::Acceleration, 9.80665, &["gforce", "g-force"], 2),
    // Heart rate
    unit(
        "bpm",
        Dimension::HeartRate,
        1.0,
        &["beats/min", "b/min", "уд/мин"],
        0,
    ),
    // Ratio
    unit("ratio", Dimension::Ratio, 1.0, &["fraction"], 3),
    unit("%", Dimension::Ratio, 0.01, &["pct", "percent", "percentage"], 1),
    // Count
    unit(
        "count",
        Dimension::Count,
        1.0,
        &["n", "#", "times", "reps", "efforts", "кол-во"],
        0,
    ),
    // Load
    unit(
        "AU",
        Dimension::Load,
        1.0,
        &["a.u.", "arbitrary units", "units"],
        1,
    ),
    // Energy
    unit("kJ", Dimension::Energy, 1.0, &["kilojoule", "kilojoules"], 0),
    unit(
        "kcal",
        Dimension::Energy,
        4.184,
        &["cal", "kilocalorie", "kilocalories", "ккал"],
        0,
    ),
    unit("J", Dimension::Energy, 0.001, &["joule", "joules"], 0),
    // Mass
    unit("kg", Dimension::Mass, 1.0, &["kilogram", "kilograms", "кг"], 1),
    unit("g", Dimension::Mass, 0.001, &["gram", "grams"], 0),
    unit("lb", Dimension::Mass, 0.45359237, &["lbs", "pound", "pounds"], 1),
    // Power (mass-normalised)
    unit("W/kg", Dimension::Power, 1.0, &["wkg", "w/kg", "watts/kg"], 2),
    // Identity
    unit("string", Dimension::Identity, 1.0, &["text"], 0),
];

/// Default display unit per dimension.
fn default_display_code(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Distance => "m",
        Dimension::Time => "min",
        Dimension::Speed => "km/h",
        Dimension::Acceleration => "m/s^2",
        Dimension::HeartRate => "bpm",
        Dimension::Ratio => "%",
        Dimension::Count => "count",
        Dimension::Load => "AU",
        Dimension::Energy => "kcal",
        Dimension::Mass => "kg",
        Dimension::Power => "W/kg",
        Dimension::Identity => "string",
    }
}

/// Immutable catalog of units, indexed by dimension and spelling.
///
/// Safe to share between any number of readers; build it once with
/// [`UnitTable::standard`] and pass it by reference.
#[derive(Debug, Clone)]
pub struct UnitTable {
    units: Vec<UnitDef>,
    index: BTreeMap<(Dimension, String), usize>,
}

impl UnitTable {
    pub fn standard() -> Self {
        Self::from_units(STANDARD_UNITS.to_vec())
    }

    fn from_units(units: Vec<UnitDef>) -> Self {
        let mut index = BTreeMap::new();
        for (idx, def) in units.iter().enumerate() {
            for spelling in std::iter::once(def.code).chain(def.aliases.iter().copied()) {
                index
                    .entry((def.dimension, unit_key(spelling)))
                    .or_insert(idx);
            }
        }
        Self { units, index }
    }

    /// Looks up a unit by code or alias, case-insensitively.
    pub fn resolve(&self, dimension: Dimension, unit: &str) -> Option<&UnitDef> {
        self.index
            .get(&(dimension, unit_key(unit)))
            .map(|idx| &self.units[*idx])
    }

    fn require(&self, dimension: Dimension, unit: &str) -> Result<&UnitDef, UnitError> {
        self.resolve(dimension, unit)
            .ok_or_else(|| UnitError::UnsupportedUnit {
                unit: unit.to_string(),
                dimension,
            })
    }

    /// Units of one dimension in table order.
    pub fn units_of(&self, dimension: Dimension) -> impl Iterator<Item = &UnitDef> {
        self.units
            .iter()
            .filter(move |def| def.dimension == dimension)
    }

    pub fn base_unit(&self, dimension: Dimension) -> Option<&UnitDef> {
        self.units_of(dimension).next()
    }

    /// Converts `value` between two units of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::UnsupportedUnit`] when either unit is not
    /// registered for `dimension`.
    pub fn convert(
        &self,
        value: f64,
        from: &str,
        to: &str,
        dimension: Dimension,
    ) -> Result<f64, UnitError> {
        let from = self.require(dimension, from)?;
        let to = self.require(dimension, to)?;
        if from.code == to.code {
            return Ok(value);
        }
        Ok(value * from.factor / to.factor)
    }

    /// Reads a raw cell as a number expressed in `unit`.
    ///
    /// Accepts a comma decimal separator. For the time dimension, text
    /// containing `:` is read as clock text, taken to seconds, then expressed
    /// in `unit`.
    pub fn parse_value(
        &self,
        text: &str,
        unit: &str,
        dimension: Dimension,
    ) -> Result<f64, UnitError> {
        if !dimension.is_numeric() {
            return Err(UnitError::NotNumeric(dimension));
        }
        let def = self.require(dimension, unit)?;
        let malformed = || UnitError::MalformedValue {
            value: text.to_string(),
            dimension,
        };
        let trimmed = text.trim();
        if dimension == Dimension::Time && trimmed.contains(':') {
            let layout = match def.clock {
                Some(ClockLayout::MinutesSeconds) => ClockLayout::MinutesSeconds,
                _ => ClockLayout::HoursMinutes,
            };
            let seconds = parse_clock(trimmed, layout).ok_or_else(malformed)?;
            return Ok(seconds / def.factor);
        }
        let trimmed = if def.code == "%" {
            trimmed.trim_end_matches('%')
        } else {
            trimmed
        };
        parse_number(trimmed).ok_or_else(malformed)
    }

    /// Display units allowed for a metric, as table codes.
    pub fn allowed_display_units(&self, metric: &CanonicalMetric) -> Vec<&'static str> {
        if metric.display_units.is_empty() {
            return self.units_of(metric.dimension).map(|def| def.code).collect();
        }
        metric
            .display_units
            .iter()
            .filter_map(|unit| self.resolve(metric.dimension, unit))
            .map(|def| def.code)
            .collect()
    }

    /// Source units a column may declare for a metric, as table codes.
    pub fn supported_source_units(&self, metric: &CanonicalMetric) -> Vec<&'static str> {
        if metric.supported_units.is_empty() {
            return self.units_of(metric.dimension).map(|def| def.code).collect();
        }
        metric
            .supported_units
            .iter()
            .filter_map(|unit| self.resolve(metric.dimension, unit))
            .map(|def| def.code)
            .collect()
    }

    /// Dimension default when the metric allows it, else the canonical unit.
    pub fn suggest_default_display_unit(&self, metric: &CanonicalMetric) -> &'static str {
        let allowed = self.allowed_display_units(metric);
        let preferred = default_display_code(metric.dimension);
        if allowed.contains(&preferred) {
            return preferred;
        }
        self.resolve(metric.dimension, &metric.canonical_unit)
            .map(|def| def.code)
            .or_else(|| allowed.first().copied())
            .unwrap_or(preferred)
    }

    /// Renders a canonical value in `display_unit`.
    pub fn format_display(
        &self,
        value: f64,
        metric: &CanonicalMetric,
        display_unit: &str,
    ) -> Result<String, UnitError> {
        let target = self.require(metric.dimension, display_unit)?;
        let converted = self.convert(
            value,
            &metric.canonical_unit,
            target.code,
            metric.dimension,
        )?;
        Ok(match target.clock {
            Some(layout) => format_clock(converted, layout),
            None => format!("{converted:.prec$}", prec = target.precision),
        })
    }
}

fn unit_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parses a decimal number, accepting `,` as the decimal separator.
///
/// With both separators present, the one that appears last is the decimal
/// point and the other is a thousands separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '\u{a0}')
        .collect();
    if compact.is_empty() {
        return None;
    }
    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };
    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses `h:m:s`, `h:m` or `m:s` text to seconds.
///
/// The last part may carry a fraction (`.5` or `,5`). Parts after the first
/// must be below 60.
pub fn parse_clock(raw: &str, two_part: ClockLayout) -> Option<f64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let (last, leading) = parts.split_last()?;
    let mut numbers = Vec::with_capacity(parts.len());
    for part in leading {
        if part.is_empty() || !part.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        numbers.push(part.parse::<f64>().ok()?);
    }
    let last = last.replace(',', ".");
    if last.is_empty() || !last.chars().all(|ch| ch.is_ascii_digit() || ch == '.') {
        return None;
    }
    numbers.push(last.parse::<f64>().ok()?);
    if numbers.iter().skip(1).any(|value| *value >= 60.0) {
        return None;
    }
    match (numbers.as_slice(), two_part) {
        ([h, m, s], _) => Some(h * 3600.0 + m * 60.0 + s),
        ([m, s], ClockLayout::MinutesSeconds) => Some(m * 60.0 + s),
        ([h, m], _) => Some(h * 3600.0 + m * 60.0),
        _ => None,
    }
}

/// Renders seconds as clock text. Fractions of a second are rounded.
pub fn format_clock(seconds: f64, layout: ClockLayout) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total = seconds.abs().round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    match layout {
        ClockLayout::HoursMinutesSeconds => format!("{sign}{h}:{m:02}:{s:02}"),
        ClockLayout::HoursMinutes => format!("{sign}{h}:{m:02}"),
        ClockLayout::MinutesSeconds => format!("{sign}{}:{s:02}", h * 60 + m),
    }
}
