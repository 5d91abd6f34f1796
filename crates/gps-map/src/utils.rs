//! Header text helpers shared by the alias index and the fuzzy matcher.

use std::collections::BTreeSet;

/// Longest text after a trailing comma that is still read as a unit.
const MAX_COMMA_UNIT_LEN: usize = 8;

/// Normalizes header text for comparison.
///
/// Transliterates to ASCII, lowercases, keeps `%` as its own token and turns
/// every other separator into a single space.
pub fn normalize_header(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw.trim());
    let mut out = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if ch == '%' {
            out.push_str(" % ");
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a trailing unit off a header.
///
/// Recognizes `Name (unit)`, `Name [unit]`, `Name, unit` and `Name %`. The
/// returned unit is raw text; callers resolve it against a dimension.
pub fn split_unit_suffix(raw: &str) -> (&str, Option<&str>) {
    let trimmed = raw.trim();
    for (open, close) in [('(', ')'), ('[', ']')] {
        if let Some(rest) = trimmed.strip_suffix(close)
            && let Some(start) = rest.rfind(open)
        {
            let unit = rest[start + open.len_utf8()..].trim();
            let base = rest[..start].trim();
            if !unit.is_empty() && !base.is_empty() {
                return (base, Some(unit));
            }
        }
    }
    if let Some((base, unit)) = trimmed.rsplit_once(',') {
        let (base, unit) = (base.trim(), unit.trim());
        if !base.is_empty()
            && !unit.is_empty()
            && unit.chars().count() <= MAX_COMMA_UNIT_LEN
            && !unit.contains(' ')
        {
            return (base, Some(unit));
        }
    }
    if let Some(base) = trimmed.strip_suffix('%') {
        let base = base.trim();
        if !base.is_empty() {
            return (base, Some("%"));
        }
    }
    (trimmed, None)
}

pub fn token_set(normalized: &str) -> BTreeSet<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_separators_and_script() {
        assert_eq!(normalize_header("  Max_Speed  (km/h) "), "max speed km h");
        assert_eq!(normalize_header("HSR%"), "hsr %");
        assert_eq!(normalize_header("Общая дистанция"), normalize_header("общая  дистанция"));
        assert_eq!(normalize_header("Vélocité"), "velocite");
    }

    #[test]
    fn splits_unit_suffixes() {
        assert_eq!(split_unit_suffix("Max Speed (km/h)"), ("Max Speed", Some("km/h")));
        assert_eq!(split_unit_suffix("Distance [m]"), ("Distance", Some("m")));
        assert_eq!(split_unit_suffix("Дистанция, м"), ("Дистанция", Some("м")));
        assert_eq!(split_unit_suffix("HSR %"), ("HSR", Some("%")));
        assert_eq!(split_unit_suffix("Player"), ("Player", None));
        assert_eq!(split_unit_suffix("(m)"), ("(m)", None));
        assert_eq!(
            split_unit_suffix("Smith, John Paul"),
            ("Smith, John Paul", None)
        );
    }
}
