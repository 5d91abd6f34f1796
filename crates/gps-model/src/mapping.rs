//! Column mapping rows of a report profile.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MetricCode;

/// Identity of a profile row.
///
/// The source header alone is not enough: the same header can feed two
/// canonical targets, and display names may be edited freely.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    pub canonical_metric: Option<MetricCode>,
    pub mapped_column: String,
}

impl MappingKey {
    pub fn new(canonical_metric: Option<MetricCode>, mapped_column: impl Into<String>) -> Self {
        Self {
            canonical_metric,
            mapped_column: mapped_column.into(),
        }
    }

    /// Key of a row that has not been mapped yet.
    pub fn unmapped(mapped_column: impl Into<String>) -> Self {
        Self::new(None, mapped_column)
    }
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.canonical_metric {
            Some(code) => write!(f, "{code} <- {:?}", self.mapped_column),
            None => write!(f, "(unmapped) <- {:?}", self.mapped_column),
        }
    }
}

/// One row of a report profile: source column -> canonical metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Header text of the source column this row reads from.
    pub mapped_column: String,
    #[serde(default)]
    pub canonical_metric: Option<MetricCode>,
    /// Unit the source column is expressed in.
    #[serde(default)]
    pub source_unit: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub display_unit: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl ColumnMapping {
    pub fn new(mapped_column: impl Into<String>) -> Self {
        let mapped_column = mapped_column.into();
        Self {
            display_name: mapped_column.clone(),
            mapped_column,
            canonical_metric: None,
            source_unit: None,
            display_unit: None,
            locked: false,
            is_visible: true,
        }
    }

    pub fn key(&self) -> MappingKey {
        MappingKey::new(self.canonical_metric.clone(), self.mapped_column.clone())
    }

    pub fn is_mapped(&self) -> bool {
        self.canonical_metric.is_some()
    }
}

/// Hints about a source column's contents, gathered from sample rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnHint {
    /// True if every non-empty value reads as a number or clock text.
    pub is_numeric: bool,
    /// Ratio of empty values to total rows (0.0 to 1.0).
    pub null_ratio: f64,
}
