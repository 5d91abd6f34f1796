use serde::{Deserialize, Serialize};

use gps_identity::MatchThresholds;

/// Default cap on data rows per report.
pub const DEFAULT_MAX_ROWS: usize = 50_000;

/// What to do when the same header appears more than once in a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHeaderPolicy {
    /// Read the first occurrence and add a report warning.
    #[default]
    FirstWins,
    Reject,
}

/// Which derived metrics a run computes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedPolicy {
    /// Only derived metrics whose source inputs are all mapped by the
    /// profile. Rows missing one of those inputs get the metric marked
    /// unavailable.
    #[default]
    Mapped,
    /// Every active derived metric, whether or not the profile can feed it.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// `None` disables the row cap.
    pub max_rows: Option<usize>,
    pub duplicate_headers: DuplicateHeaderPolicy,
    pub derived: DerivedPolicy,
    pub thresholds: MatchThresholds,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_rows: Some(DEFAULT_MAX_ROWS),
            duplicate_headers: DuplicateHeaderPolicy::default(),
            derived: DerivedPolicy::default(),
            thresholds: MatchThresholds::default(),
        }
    }
}
