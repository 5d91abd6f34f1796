//! Header-to-metric suggestion engine.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gps_model::{CanonicalMetric, ColumnHint, ColumnMapping, Dimension, MetricCode};
use gps_standards::{MetricRegistry, UnitTable};

use crate::patterns::{AliasIndex, is_mappable, match_quick_pattern, spellings};
use crate::utils::{normalize_header, split_unit_suffix, token_set};

const DEFAULT_MIN_CONFIDENCE: f32 = 0.80;
const QUICK_PATTERN_CONFIDENCE: f32 = 0.95;
/// Fuzzy matches never reach the confidence of an exact alias.
const FUZZY_CEILING: f64 = 0.99;
const MIN_FUZZY_CHARS: usize = 3;
const TOKEN_MATCH_MIN: f64 = 0.92;
const TOKEN_NO_OVERLAP_PENALTY: f64 = 0.6;
const TOKEN_GENERIC_ONLY_PENALTY: f64 = 0.55;
const TOKEN_SPECIFIC_BOOST: f64 = 1.05;
const TOKEN_PARTIAL_PENALTY: f64 = 0.85;
const UNIT_MISMATCH_PENALTY: f32 = 0.7;
const HINT_MISMATCH_PENALTY: f32 = 0.85;

/// Tokens that say little about which metric a header means.
const GENERIC_TOKENS: &[&str] = &[
    "avg", "average", "count", "in", "max", "maximum", "mean", "min", "number", "of", "total",
    "zone",
];

/// How a suggestion was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Alias,
    Pattern,
    Fuzzy,
}

/// Suggested canonical target for one source header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub metric: MetricCode,
    pub confidence: f32,
    /// Source unit read from the header, as a unit table code.
    pub source_unit: Option<String>,
    pub reason: MatchReason,
}

/// Result of suggesting a whole header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingResult {
    /// One row per distinct header, in header order.
    pub columns: Vec<ColumnMapping>,
    pub suggestions: BTreeMap<String, Suggestion>,
    pub unmapped_columns: Vec<String>,
}

struct Target {
    code: MetricCode,
    labels: Vec<String>,
    tokens: BTreeSet<String>,
}

/// Suggests canonical metrics for source headers.
///
/// Lookups run in order: exact alias (full header, then header without its
/// unit suffix), quick patterns, then fuzzy Jaro-Winkler scoring adjusted by
/// token overlap. Derived and inactive metrics are never suggested.
pub struct SuggestionEngine<'a> {
    registry: &'a MetricRegistry,
    units: &'a UnitTable,
    min_confidence: f32,
    aliases: AliasIndex,
    targets: Vec<Target>,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(registry: &'a MetricRegistry, units: &'a UnitTable) -> Self {
        let targets = registry
            .iter()
            .filter(|metric| is_mappable(metric))
            .map(|metric| {
                let labels: Vec<String> = spellings(metric)
                    .iter()
                    .map(|s| normalize_header(&s.replace('_', " ")))
                    .filter(|s| !s.is_empty())
                    .collect();
                let tokens = labels.iter().flat_map(|l| token_set(l)).collect();
                Target {
                    code: metric.code.clone(),
                    labels,
                    tokens,
                }
            })
            .collect();
        Self {
            registry,
            units,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            aliases: AliasIndex::build(registry),
            targets,
        }
    }

    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Suggests a canonical metric for one header.
    pub fn suggest_canonical(&self, header: &str) -> Option<Suggestion> {
        let (base, unit_hint) = split_unit_suffix(header);
        let full = normalize_header(header);
        let stripped = normalize_header(base);

        let (code, confidence, reason) = self
            .aliases
            .lookup(&full)
            .or_else(|| self.aliases.lookup(&stripped))
            .map(|code| (code.clone(), 1.0, MatchReason::Alias))
            .or_else(|| {
                match_quick_pattern(&stripped)
                    .and_then(|code| self.mappable(&code))
                    .map(|code| (code, QUICK_PATTERN_CONFIDENCE, MatchReason::Pattern))
            })
            .or_else(|| {
                self.fuzzy(&stripped)
                    .map(|(code, score)| (code, score, MatchReason::Fuzzy))
            })?;
        let metric = self.registry.lookup(code.as_str())?;

        let (source_unit, confidence) = match unit_hint {
            Some(hint) if metric.is_numeric() => match self.units.resolve(metric.dimension, hint) {
                Some(def) => (Some(def.code.to_string()), confidence),
                None if self.is_known_unit(hint) => (None, confidence * UNIT_MISMATCH_PENALTY),
                None => (None, confidence),
            },
            _ => (None, confidence),
        };
        if confidence < self.min_confidence {
            debug!(header, metric = %code, confidence, "suggestion below threshold");
            return None;
        }
        Some(Suggestion {
            metric: code,
            confidence,
            source_unit,
            reason,
        })
    }

    /// Suggests a profile for a whole header row.
    ///
    /// Each metric is assigned to at most one column: candidates are taken
    /// by confidence, ties broken by header position. Identity metrics are
    /// never assigned to numeric columns; numeric metrics on text columns
    /// lose some confidence. Repeated headers are considered once.
    pub fn suggest_profile(
        &self,
        headers: &[String],
        hints: &BTreeMap<String, ColumnHint>,
    ) -> MappingResult {
        let mut seen = BTreeSet::new();
        let mut distinct: Vec<&String> = Vec::new();
        let mut candidates: Vec<(usize, Suggestion)> = Vec::new();
        for header in headers {
            if !seen.insert(header.as_str()) {
                continue;
            }
            let position = distinct.len();
            distinct.push(header);
            let Some(mut suggestion) = self.suggest_canonical(header) else {
                continue;
            };
            let Some(metric) = self.registry.lookup(suggestion.metric.as_str()) else {
                continue;
            };
            if let Some(hint) = hints.get(header.as_str()) {
                match hint_agreement(metric, hint) {
                    HintAgreement::Agrees => {}
                    HintAgreement::Weak => suggestion.confidence *= HINT_MISMATCH_PENALTY,
                    HintAgreement::Incompatible => continue,
                }
            }
            if suggestion.confidence >= self.min_confidence {
                candidates.push((position, suggestion));
            }
        }

        candidates.sort_by(|(pa, a), (pb, b)| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then(pa.cmp(pb))
        });
        let mut taken: BTreeSet<MetricCode> = BTreeSet::new();
        let mut assigned: BTreeMap<usize, Suggestion> = BTreeMap::new();
        for (position, suggestion) in candidates {
            if taken.insert(suggestion.metric.clone()) {
                assigned.insert(position, suggestion);
            }
        }

        let mut result = MappingResult::default();
        for (position, header) in distinct.into_iter().enumerate() {
            let mut column = ColumnMapping::new(header.as_str());
            match assigned.remove(&position) {
                Some(suggestion) => {
                    if let Some(metric) = self.registry.lookup(suggestion.metric.as_str())
                        && metric.is_numeric()
                    {
                        column.display_unit =
                            Some(self.units.suggest_default_display_unit(metric).to_string());
                    }
                    column.canonical_metric = Some(suggestion.metric.clone());
                    column.source_unit = suggestion.source_unit.clone();
                    result.suggestions.insert(header.clone(), suggestion);
                }
                None => result.unmapped_columns.push(header.clone()),
            }
            result.columns.push(column);
        }
        debug!(
            headers = result.columns.len(),
            mapped = result.suggestions.len(),
            unmapped = result.unmapped_columns.len(),
            "profile suggested"
        );
        result
    }

    fn mappable(&self, code: &str) -> Option<MetricCode> {
        self.registry
            .lookup(code)
            .filter(|metric| is_mappable(metric))
            .map(|metric| metric.code.clone())
    }

    fn is_known_unit(&self, hint: &str) -> bool {
        Dimension::ALL
            .iter()
            .any(|dimension| self.units.resolve(*dimension, hint).is_some())
    }

    fn fuzzy(&self, normalized: &str) -> Option<(MetricCode, f32)> {
        if normalized.chars().count() < MIN_FUZZY_CHARS {
            return None;
        }
        let tokens = token_set(normalized);
        let mut best: Option<(&Target, f64)> = None;
        for target in &self.targets {
            let similarity = target
                .labels
                .iter()
                .map(|label| jaro_similarity(normalized.chars(), label.chars()))
                .fold(0.0, f64::max);
            let score = (similarity * overlap_adjustment(&tokens, &target.tokens)).min(FUZZY_CEILING);
            let better = match best {
                None => true,
                Some((current, current_score)) => {
                    score > current_score || (score == current_score && target.code < current.code)
                }
            };
            if better {
                best = Some((target, score));
            }
        }
        best.map(|(target, score)| (target.code.clone(), score as f32))
    }
}

/// Scales a character similarity by how many header words the target
/// shares. Words match approximately so a typo still counts.
fn overlap_adjustment(header: &BTreeSet<String>, target: &BTreeSet<String>) -> f64 {
    let matched: Vec<&String> = header
        .iter()
        .filter(|token| {
            target.iter().any(|candidate| {
                *token == candidate
                    || (token.len() > 3
                        && jaro_similarity(token.chars(), candidate.chars()) >= TOKEN_MATCH_MIN)
            })
        })
        .collect();
    if matched.is_empty() {
        TOKEN_NO_OVERLAP_PENALTY
    } else if matched
        .iter()
        .all(|token| GENERIC_TOKENS.contains(&token.as_str()))
    {
        TOKEN_GENERIC_ONLY_PENALTY
    } else if matched.len() == header.len() {
        TOKEN_SPECIFIC_BOOST
    } else {
        TOKEN_PARTIAL_PENALTY
    }
}

enum HintAgreement {
    Agrees,
    Weak,
    Incompatible,
}

fn hint_agreement(metric: &CanonicalMetric, hint: &ColumnHint) -> HintAgreement {
    let empty = hint.null_ratio >= 1.0;
    match (metric.is_numeric(), hint.is_numeric) {
        _ if empty => HintAgreement::Agrees,
        (true, true) | (false, false) => HintAgreement::Agrees,
        (true, false) => HintAgreement::Weak,
        (false, true) => HintAgreement::Incompatible,
    }
}
