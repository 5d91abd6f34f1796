//! Alias index over the registry and quick header patterns.

use std::collections::BTreeMap;

use gps_model::{CanonicalMetric, MetricCode};
use gps_standards::MetricRegistry;

use crate::utils::normalize_header;

/// Short vendor spellings not worth listing as registry aliases.
const QUICK_PATTERNS: &[(&str, &str)] = &[
    ("tot dist", "total_distance"),
    ("total dist", "total_distance"),
    ("dist m", "total_distance"),
    ("hsr dist", "hsr_distance"),
    ("hsd m", "hsr_distance"),
    ("spr dist", "sprint_distance"),
    ("no sprints", "sprints_count"),
    ("v max", "max_speed"),
    ("top spd", "max_speed"),
    ("max spd", "max_speed"),
    ("avg spd", "avg_speed"),
    ("pl", "player_load"),
    ("acc count", "accelerations_count"),
    ("dec count", "decelerations_count"),
    ("hr avg", "avg_heart_rate"),
    ("hr max", "max_heart_rate"),
    ("mins", "duration"),
];

/// Normalized alias -> metric lookup built from codes, names and aliases.
///
/// Only active, non-derived metrics are indexed. The first metric to claim a
/// spelling keeps it. A second key with spaces removed catches headers such
/// as `MaxSpeed`.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    exact: BTreeMap<String, MetricCode>,
    compact: BTreeMap<String, MetricCode>,
}

impl AliasIndex {
    pub fn build(registry: &MetricRegistry) -> Self {
        let mut index = Self::default();
        for metric in registry.iter().filter(|m| is_mappable(m)) {
            for spelling in spellings(metric) {
                index.insert(&spelling, &metric.code);
            }
        }
        index
    }

    fn insert(&mut self, raw: &str, code: &MetricCode) {
        let normalized = normalize_header(raw);
        if normalized.is_empty() {
            return;
        }
        self.compact
            .entry(normalized.replace(' ', ""))
            .or_insert_with(|| code.clone());
        self.exact.entry(normalized).or_insert_with(|| code.clone());
    }

    /// Looks up an already-normalized header.
    pub fn lookup(&self, normalized: &str) -> Option<&MetricCode> {
        if normalized.is_empty() {
            return None;
        }
        self.exact
            .get(normalized)
            .or_else(|| self.compact.get(&normalized.replace(' ', "")))
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}

pub(crate) fn is_mappable(metric: &CanonicalMetric) -> bool {
    metric.is_active && !metric.is_derived
}

pub(crate) fn spellings(metric: &CanonicalMetric) -> Vec<String> {
    let mut out = vec![metric.code.as_str().to_string(), metric.name.clone()];
    out.extend(metric.aliases.iter().cloned());
    out
}

/// Matches the quick patterns and zone-numbered headers.
///
/// `normalized` must come from [`normalize_header`]. The returned code may
/// not exist in a custom registry; callers check it.
pub fn match_quick_pattern(normalized: &str) -> Option<String> {
    if let Some((_, code)) = QUICK_PATTERNS.iter().find(|(pattern, _)| *pattern == normalized) {
        return Some((*code).to_string());
    }
    match_zone(normalized)
}

/// Reads `z4`, `zone4`, `zone 4` plus a qualifier (time, entries, hr, acc,
/// dec) and picks the zone family.
fn match_zone(normalized: &str) -> Option<String> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let zone = zone_number(&tokens)?;
    let has = |words: &[&str]| tokens.iter().any(|t| words.contains(t));
    let code = if has(&["hr", "heart", "pulse"]) {
        format!("time_in_hr_zone{zone}")
    } else if has(&["acc", "accel", "acceleration", "accelerations"]) {
        format!("acc_zone{zone}_count")
    } else if has(&["dec", "decel", "deceleration", "decelerations"]) {
        format!("dec_zone{zone}_count")
    } else if has(&["entries", "entry", "efforts"]) {
        format!("speed_zone{zone}_entries")
    } else if has(&["time", "duration", "min", "mins"]) {
        format!("time_in_speed_zone{zone}")
    } else {
        format!("distance_zone{zone}")
    };
    Some(code)
}

fn zone_number(tokens: &[&str]) -> Option<u8> {
    for (idx, token) in tokens.iter().enumerate() {
        let digits = token
            .strip_prefix("zone")
            .or_else(|| token.strip_prefix('z'));
        let Some(digits) = digits else { continue };
        let digits = if digits.is_empty() {
            match tokens.get(idx + 1) {
                Some(next) => *next,
                None => continue,
            }
        } else {
            digits
        };
        if let Ok(zone @ 1..=6) = digits.parse::<u8>() {
            return Some(zone);
        }
    }
    None
}
