//! Canonical output of a pipeline run.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{MatchCandidate, MetricCode, PlayerId, PlayerMapping};

/// Where a resolved player identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Memory,
    Fuzzy,
}

/// Player identity attached to a canonical row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayerResolution {
    Resolved {
        player_id: PlayerId,
        confidence: f64,
        source: ResolutionSource,
    },
    /// A plausible candidate exists but a human has to confirm it.
    PendingReview { candidate: PlayerId, confidence: f64 },
    Unresolved,
}

impl PlayerResolution {
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::Resolved { player_id, .. } => Some(player_id),
            Self::PendingReview { .. } | Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Cell text could not be read as a value of the column's unit.
    MalformedCell,
    /// Value converted fine but lies outside the metric's plausible range.
    Implausible,
    /// A derived metric could not be computed for the row.
    DerivedUnavailable,
    UnresolvedPlayer,
    PendingReview,
    /// The row has no athlete name to resolve.
    MissingName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub kind: WarningKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl RowWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            metric: None,
            column: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: &MetricCode) -> Self {
        self.metric = Some(metric.clone());
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// One fully resolved, unit-normalised record for a single source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    /// 1-based index among the file's data rows.
    pub row_index: usize,
    pub raw_name: Option<String>,
    pub player: PlayerResolution,
    /// Numeric values in each metric's canonical unit.
    pub values: BTreeMap<MetricCode, f64>,
    /// Text-valued identity metrics such as `position`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<MetricCode, String>,
    /// Derived metrics whose inputs were absent for this row.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable: BTreeSet<MetricCode>,
    #[serde(default)]
    pub warnings: Vec<RowWarning>,
}

impl CanonicalRow {
    pub fn value(&self, code: &str) -> Option<f64> {
        self.values
            .iter()
            .find_map(|(key, value)| (key.as_str() == code).then_some(*value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub resolved_count: usize,
    /// Rows without a confirmed identity, including rows awaiting review.
    pub unresolved_count: usize,
    /// Profile metrics whose source column is absent from the file.
    pub missing_headers: Vec<MetricCode>,
    /// Total of row-level warnings plus report-level warnings.
    pub warning_count: usize,
    pub report_warnings: Vec<String>,
    pub skipped_summary_rows: usize,
}

/// A name that needs a human decision, with the ranked candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub raw_name: String,
    pub candidates: Vec<MatchCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalOutput {
    pub rows: Vec<CanonicalRow>,
    pub diagnostics: Diagnostics,
    /// Mappings the caller should persist after confident fuzzy matches.
    pub new_player_mapping_suggestions: Vec<PlayerMapping>,
    pub pending_reviews: Vec<ReviewItem>,
}
