use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Kind of physical quantity a metric measures.
///
/// Every dimension owns a closed set of interconvertible units; see
/// `gps_standards::UnitTable` for the table itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Distance,
    Time,
    Speed,
    Acceleration,
    HeartRate,
    Ratio,
    Count,
    Load,
    Energy,
    Mass,
    /// Mass-normalised power (W/kg).
    Power,
    /// Free text such as athlete name or position. Never converted.
    Identity,
}

impl Dimension {
    pub const ALL: [Dimension; 12] = [
        Dimension::Distance,
        Dimension::Time,
        Dimension::Speed,
        Dimension::Acceleration,
        Dimension::HeartRate,
        Dimension::Ratio,
        Dimension::Count,
        Dimension::Load,
        Dimension::Energy,
        Dimension::Mass,
        Dimension::Power,
        Dimension::Identity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Time => "time",
            Self::Speed => "speed",
            Self::Acceleration => "acceleration",
            Self::HeartRate => "heart_rate",
            Self::Ratio => "ratio",
            Self::Count => "count",
            Self::Load => "load",
            Self::Energy => "energy",
            Self::Mass => "mass",
            Self::Power => "power",
            Self::Identity => "identity",
        }
    }

    /// Returns false for the text-valued identity dimension.
    pub fn is_numeric(self) -> bool {
        self != Self::Identity
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let dimension = match key.as_str() {
            "distance" => Self::Distance,
            "time" | "duration" => Self::Time,
            "speed" | "velocity" => Self::Speed,
            "acceleration" => Self::Acceleration,
            "heart_rate" | "heartrate" | "hr" => Self::HeartRate,
            "ratio" | "percentage" => Self::Ratio,
            "count" => Self::Count,
            "load" => Self::Load,
            "energy" => Self::Energy,
            "mass" => Self::Mass,
            "power" | "power_mass_norm" => Self::Power,
            "identity" | "text" => Self::Identity,
            _ => return Err(ModelError::UnknownDimension(s.to_string())),
        };
        Ok(dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_and_round_trips_names() {
        for dimension in Dimension::ALL {
            assert_eq!(dimension.as_str().parse::<Dimension>().unwrap(), dimension);
        }
        assert_eq!("Heart-Rate".parse::<Dimension>().unwrap(), Dimension::HeartRate);
        assert_eq!(
            "power_mass_norm".parse::<Dimension>().unwrap(),
            Dimension::Power
        );
        assert!("volume".parse::<Dimension>().is_err());
    }
}
