#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Stable identifier of a canonical metric, e.g. `total_distance`.
///
/// Codes double as identifiers in derived-metric formulas, so they are limited
/// to ASCII letters, digits and underscores and must start with a letter.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MetricCode(String);

impl MetricCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        let valid_start = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic());
        if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(ModelError::InvalidId {
                kind: "metric code",
                value,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MetricCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetricCode> for String {
    fn from(value: MetricCode) -> Self {
        value.0
    }
}

impl fmt::Display for MetricCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for MetricCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MetricCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque, non-empty string identifiers supplied by collaborators.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::InvalidId { kind: $kind, value });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Roster player identifier.
    PlayerId,
    "player id"
);
opaque_id!(
    /// Team identifier. Player mappings are scoped to one team.
    TeamId,
    "team id"
);
opaque_id!(
    /// Club (tenant) identifier.
    ClubId,
    "club id"
);
opaque_id!(
    /// Name of the vendor system that produced a report, e.g. `catapult`.
    GpsSystem,
    "gps system"
);
