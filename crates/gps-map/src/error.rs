use thiserror::Error;

use gps_model::{Dimension, MappingKey, MetricCode};

/// Errors raised while editing a report profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("profile version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("column {key} not found in profile")]
    ColumnNotFound { key: MappingKey },

    #[error("column {key} already exists in profile")]
    DuplicateColumn { key: MappingKey },

    #[error("column {key} is locked")]
    Locked { key: MappingKey },

    #[error("column {key} has no canonical metric")]
    NotMapped { key: MappingKey },

    #[error("unknown canonical metric: {code}")]
    UnknownMetric { code: String },

    #[error("metric {code} is derived and cannot be read from a column")]
    DerivedTarget { code: MetricCode },

    #[error("unit {unit:?} is not a {dimension} unit (metric {metric})")]
    InvalidUnit {
        metric: MetricCode,
        unit: String,
        dimension: Dimension,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;
