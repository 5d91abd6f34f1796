//! Header position lookup for a parsed report.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::options::DuplicateHeaderPolicy;

/// Header spellings used for the athlete column when no profile row maps
/// `athlete_name`.
const NAME_HEADERS: &[&str] = &[
    "player",
    "player name",
    "name",
    "athlete",
    "athlete name",
    "игрок",
    "фио",
];

fn fold(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Positions of the headers in one file.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    exact: BTreeMap<String, usize>,
    folded: BTreeMap<String, usize>,
    /// Report-level notes about repeated headers.
    pub warnings: Vec<String>,
}

impl HeaderIndex {
    /// Indexes `headers`, applying `policy` to repeats.
    ///
    /// Repeats are detected on the folded spelling, so `Distance` and
    /// `distance ` count as the same header.
    pub fn build(headers: &[String], policy: DuplicateHeaderPolicy) -> Result<Self> {
        let mut index = Self::default();
        for (position, header) in headers.iter().enumerate() {
            let folded = fold(header);
            if let Some(first) = index.folded.get(&folded).copied() {
                match policy {
                    DuplicateHeaderPolicy::Reject => {
                        return Err(PipelineError::DuplicateHeader {
                            header: header.clone(),
                            first: first + 1,
                            second: position + 1,
                        });
                    }
                    DuplicateHeaderPolicy::FirstWins => {
                        warn!(header = %header, first = first + 1, ignored = position + 1, "duplicate header");
                        index.warnings.push(format!(
                            "duplicate header {header:?}: column {} ignored, column {} used",
                            position + 1,
                            first + 1
                        ));
                        continue;
                    }
                }
            }
            index.exact.entry(header.clone()).or_insert(position);
            index.folded.insert(folded, position);
        }
        Ok(index)
    }

    /// Exact match first, then case-insensitive with whitespace collapsed.
    pub fn position(&self, header: &str) -> Option<usize> {
        self.exact
            .get(header)
            .or_else(|| self.folded.get(&fold(header)))
            .copied()
    }

    /// First header that looks like an athlete name column.
    pub fn name_fallback(&self) -> Option<usize> {
        NAME_HEADERS
            .iter()
            .find_map(|candidate| self.folded.get(*candidate).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn matches_exactly_then_folded() {
        let index =
            HeaderIndex::build(&headers(&["Player", "Max  Speed"]), DuplicateHeaderPolicy::Reject)
                .unwrap();
        assert_eq!(index.position("Player"), Some(0));
        assert_eq!(index.position("max speed"), Some(1));
        assert_eq!(index.position("Speed"), None);
        assert_eq!(index.name_fallback(), Some(0));
    }

    #[test]
    fn duplicates_follow_policy() {
        let names = headers(&["Player", "Distance", "distance"]);
        let index = HeaderIndex::build(&names, DuplicateHeaderPolicy::FirstWins).unwrap();
        assert_eq!(index.position("distance"), Some(1));
        assert_eq!(index.warnings.len(), 1);

        let err = HeaderIndex::build(&names, DuplicateHeaderPolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateHeader { first: 2, second: 3, .. }
        ));
    }
}
