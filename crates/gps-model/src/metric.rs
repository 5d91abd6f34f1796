//! Canonical metric definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Dimension, MetricCode, ModelError};

/// Grouping used when listing metrics.
///
/// Declaration order is the display order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Identity,
    Participation,
    Distance,
    Speed,
    SpeedZones,
    HsrSprint,
    AccDec,
    Load,
    Intensity,
    Heart,
    HeartZones,
    Derived,
    Other,
}

impl MetricCategory {
    pub const DISPLAY_ORDER: [MetricCategory; 13] = [
        MetricCategory::Identity,
        MetricCategory::Participation,
        MetricCategory::Distance,
        MetricCategory::Speed,
        MetricCategory::SpeedZones,
        MetricCategory::HsrSprint,
        MetricCategory::AccDec,
        MetricCategory::Load,
        MetricCategory::Intensity,
        MetricCategory::Heart,
        MetricCategory::HeartZones,
        MetricCategory::Derived,
        MetricCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Participation => "participation",
            Self::Distance => "distance",
            Self::Speed => "speed",
            Self::SpeedZones => "speed_zones",
            Self::HsrSprint => "hsr_sprint",
            Self::AccDec => "acc_dec",
            Self::Load => "load",
            Self::Intensity => "intensity",
            Self::Heart => "heart",
            Self::HeartZones => "heart_zones",
            Self::Derived => "derived",
            Self::Other => "other",
        }
    }

    /// Human-readable heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Participation => "Participation",
            Self::Distance => "Distance",
            Self::Speed => "Speed",
            Self::SpeedZones => "Speed zones",
            Self::HsrSprint => "High-speed running / sprint",
            Self::AccDec => "Accelerations / decelerations",
            Self::Load => "Load",
            Self::Intensity => "Intensity",
            Self::Heart => "Heart rate",
            Self::HeartZones => "Heart-rate zones",
            Self::Derived => "Derived",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::DISPLAY_ORDER
            .into_iter()
            .find(|category| category.as_str() == key)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

fn default_true() -> bool {
    true
}

/// A registry-defined measurable quantity with one canonical storage unit.
///
/// Field names follow snake_case; the camelCase spellings used by older
/// configuration exports are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMetric {
    pub code: MetricCode,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: MetricCategory,
    pub dimension: Dimension,
    #[serde(alias = "canonicalUnit")]
    pub canonical_unit: String,
    /// Units a source column may declare for this metric. Empty means every
    /// unit of the dimension.
    #[serde(default, alias = "supportedUnits")]
    pub supported_units: Vec<String>,
    /// Units the value may be rendered in. Empty means every unit of the
    /// dimension.
    #[serde(default, alias = "displayUnits")]
    pub display_units: Vec<String>,
    #[serde(default, alias = "isDerived")]
    pub is_derived: bool,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default = "default_true", alias = "isActive")]
    pub is_active: bool,
    /// Header spellings that map straight to this metric.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, alias = "plausibleMin")]
    pub plausible_min: Option<f64>,
    #[serde(default, alias = "plausibleMax")]
    pub plausible_max: Option<f64>,
}

impl CanonicalMetric {
    pub fn is_numeric(&self) -> bool {
        self.dimension.is_numeric()
    }

    /// Returns true when `value` (in the canonical unit) lies inside the
    /// configured plausibility bounds. Unbounded sides always pass.
    pub fn is_plausible(&self, value: f64) -> bool {
        self.plausible_min.is_none_or(|min| value >= min)
            && self.plausible_max.is_none_or(|max| value <= max)
    }
}
