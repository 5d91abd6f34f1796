//! Raw-name resolution against memory and roster.

use std::cmp::Ordering;

use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gps_model::{
    MappingType, MatchCandidate, MatchScope, PlayerId, PlayerMapping, PlayerResolution,
    ResolutionSource, RosterPlayer,
};

use crate::error::{IdentityError, Result};
use crate::memory::MappingMemory;
use crate::normalize::{name_orders, normalize_name};
use crate::score::{NameScorer, TokenBlendScorer};

pub const DEFAULT_CONFIDENT_THRESHOLD: f64 = 0.85;
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.60;
const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    confident: f64,
    review: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            confident: DEFAULT_CONFIDENT_THRESHOLD,
            review: DEFAULT_REVIEW_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    pub fn new(confident: f64, review: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&confident) || !(0.0..=confident).contains(&review) {
            return Err(IdentityError::InvalidThresholds { confident, review });
        }
        Ok(Self { confident, review })
    }

    pub fn confident(&self) -> f64 {
        self.confident
    }

    pub fn review(&self) -> f64 {
        self.review
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAction {
    /// Remembered mapping; never re-scored.
    Memory,
    AutoConfirm,
    NeedsReview,
    Unresolved,
}

/// Result of resolving one raw name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub raw_name: String,
    pub scope: MatchScope,
    pub action: MatchAction,
    pub best: Option<MatchCandidate>,
    /// Up to three runner-up candidates, for audit.
    pub alternatives: Vec<MatchCandidate>,
}

impl MatchOutcome {
    /// Player the row can be attached to without asking anyone.
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self.action {
            MatchAction::Memory | MatchAction::AutoConfirm => {
                self.best.as_ref().map(|best| &best.player_id)
            }
            MatchAction::NeedsReview | MatchAction::Unresolved => None,
        }
    }

    pub fn confidence(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |best| best.score)
    }

    /// Mapping a caller should persist after an auto-confirmed match.
    pub fn proposed_mapping(&self) -> Option<PlayerMapping> {
        if self.action != MatchAction::AutoConfirm {
            return None;
        }
        let best = self.best.as_ref()?;
        Some(PlayerMapping {
            raw_name: self.raw_name.clone(),
            club_id: self.scope.club_id.clone(),
            team_id: self.scope.team_id.clone(),
            gps_system: self.scope.gps_system.clone(),
            player_id: best.player_id.clone(),
            confidence_score: best.score,
            mapping_type: MappingType::Auto,
            notes: None,
        })
    }

    pub fn resolution(&self) -> PlayerResolution {
        match (self.action, &self.best) {
            (MatchAction::Memory, Some(best)) => PlayerResolution::Resolved {
                player_id: best.player_id.clone(),
                confidence: 1.0,
                source: ResolutionSource::Memory,
            },
            (MatchAction::AutoConfirm, Some(best)) => PlayerResolution::Resolved {
                player_id: best.player_id.clone(),
                confidence: best.score,
                source: ResolutionSource::Fuzzy,
            },
            (MatchAction::NeedsReview, Some(best)) => PlayerResolution::PendingReview {
                candidate: best.player_id.clone(),
                confidence: best.score,
            },
            _ => PlayerResolution::Unresolved,
        }
    }
}

/// Resolves raw report names to roster players.
#[derive(Debug, Clone)]
pub struct PlayerMatcher<S = TokenBlendScorer> {
    scorer: S,
    thresholds: MatchThresholds,
}

impl PlayerMatcher {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self::with_scorer(TokenBlendScorer::default(), thresholds)
    }
}

impl Default for PlayerMatcher {
    fn default() -> Self {
        Self::new(MatchThresholds::default())
    }
}

impl<S: NameScorer> PlayerMatcher<S> {
    pub fn with_scorer(scorer: S, thresholds: MatchThresholds) -> Self {
        Self { scorer, thresholds }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// Scores every roster player against `raw_name`.
    ///
    /// Sorted by score descending, then edit distance, then player id. Both
    /// name orders of each player are tried and the better one counts.
    pub fn rank(&self, raw_name: &str, roster: &[RosterPlayer]) -> Vec<MatchCandidate> {
        let needle = normalize_name(raw_name);
        if needle.is_empty() {
            return Vec::new();
        }
        let mut candidates: Vec<MatchCandidate> = roster
            .iter()
            .filter_map(|player| {
                let orders = name_orders(player);
                let score = orders
                    .iter()
                    .map(|order| self.scorer.score(&needle, order))
                    .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))?;
                let edit_distance = orders
                    .iter()
                    .map(|order| levenshtein::distance(needle.chars(), order.chars()))
                    .min()
                    .unwrap_or(usize::MAX);
                Some(MatchCandidate {
                    player_id: player.id.clone(),
                    display_name: player.full_name(),
                    score,
                    edit_distance,
                })
            })
            .collect();
        candidates.sort_by(compare_candidates);
        candidates
    }

    pub fn resolve(
        &self,
        raw_name: &str,
        scope: &MatchScope,
        memory: &MappingMemory,
        roster: &[RosterPlayer],
    ) -> MatchOutcome {
        let outcome = |action, best, alternatives| MatchOutcome {
            raw_name: raw_name.trim().to_string(),
            scope: scope.clone(),
            action,
            best,
            alternatives,
        };

        if let Some(mapping) = memory.lookup(raw_name, scope) {
            match roster.iter().find(|player| player.id == mapping.player_id) {
                Some(player) => {
                    let best = MatchCandidate {
                        player_id: player.id.clone(),
                        display_name: player.full_name(),
                        score: 1.0,
                        edit_distance: 0,
                    };
                    return outcome(MatchAction::Memory, Some(best), Vec::new());
                }
                None => debug!(
                    player = %mapping.player_id,
                    "remembered player is not on the roster, scoring instead"
                ),
            }
        }

        let mut ranked = self.rank(raw_name, roster).into_iter();
        let Some(best) = ranked.next() else {
            return outcome(MatchAction::Unresolved, None, Vec::new());
        };
        let alternatives: Vec<MatchCandidate> = ranked
            .filter(|candidate| candidate.score > 0.0)
            .take(MAX_ALTERNATIVES)
            .collect();
        let tied = alternatives
            .first()
            .is_some_and(|next| (best.score - next.score).abs() < f64::EPSILON);
        let action = if best.score >= self.thresholds.confident && !tied {
            MatchAction::AutoConfirm
        } else if best.score >= self.thresholds.review {
            MatchAction::NeedsReview
        } else {
            MatchAction::Unresolved
        };
        if action == MatchAction::Unresolved {
            return outcome(action, None, alternatives_with(best, alternatives));
        }
        outcome(action, Some(best), alternatives)
    }
}

/// Below-threshold candidates are still reported for audit.
fn alternatives_with(best: MatchCandidate, rest: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    std::iter::once(best)
        .filter(|candidate| candidate.score > 0.0)
        .chain(rest)
        .take(MAX_ALTERNATIVES)
        .collect()
}

fn compare_candidates(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.edit_distance.cmp(&b.edit_distance))
        .then_with(|| a.player_id.cmp(&b.player_id))
}
