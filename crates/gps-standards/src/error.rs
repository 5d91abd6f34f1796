#![deny(unsafe_code)]

use std::path::PathBuf;

use gps_model::{Dimension, MetricCode};

use crate::formula::FormulaError;

/// Configuration defects found while loading the metric registry.
///
/// All of these are fatal: a registry that fails to build is never used.
#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML registry {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate metric code: {code}")]
    DuplicateMetric { code: MetricCode },

    #[error("metric {code}: unit {unit:?} is not a {dimension} unit")]
    UnknownUnit {
        code: MetricCode,
        unit: String,
        dimension: Dimension,
    },

    #[error("metric {code}: {message}")]
    InvalidMetric { code: MetricCode, message: String },

    #[error("derived metric {code} has no formula")]
    MissingFormula { code: MetricCode },

    #[error("metric {code}: invalid formula: {source}")]
    Formula {
        code: MetricCode,
        #[source]
        source: FormulaError,
    },

    #[error("metric {code}: formula references unknown metric {reference}")]
    UnknownReference {
        code: MetricCode,
        reference: MetricCode,
    },

    #[error("cyclic formula: {}", join_cycle(.cycle))]
    CyclicFormula { cycle: Vec<MetricCode> },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_cycle(cycle: &[MetricCode]) -> String {
    cycle
        .iter()
        .map(MetricCode::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Failures of unit lookup, conversion or cell parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("unsupported unit {unit:?} for dimension {dimension}")]
    UnsupportedUnit { unit: String, dimension: Dimension },

    #[error("malformed {dimension} value {value:?}")]
    MalformedValue { value: String, dimension: Dimension },

    #[error("dimension {0} carries text, not numbers")]
    NotNumeric(Dimension),
}
