//! Name similarity scorers.
//!
//! The matcher only sees [`NameScorer`], so the scoring can be tuned or
//! replaced without touching the resolution state machine.

use std::collections::BTreeSet;

use rapidfuzz::distance::jaro_winkler::similarity as jaro_similarity;

/// Similarity between two normalized names, in `[0, 1]`.
///
/// Implementations must be symmetric and return 1.0 for identical input.
pub trait NameScorer {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Plain Jaro-Winkler over the whole string.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinklerScorer;

impl NameScorer for JaroWinklerScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        jaro_similarity(a.chars(), b.chars()).clamp(0.0, 1.0)
    }
}

const PERMUTATION_FLOOR: f64 = 0.95;
const MULTI_TOKEN_SUBSET_FLOOR: f64 = 0.92;
const INITIALS_FLOOR: f64 = 0.90;
/// A lone surname can belong to several players, so it only earns review.
const SINGLE_TOKEN_SUBSET_FLOOR: f64 = 0.75;
/// Only identical names score a full 1.0.
const NON_IDENTICAL_CEILING: f64 = 0.99;

/// Default scorer: a weighted blend of token Jaccard, token-order agreement
/// and Jaro-Winkler, raised to fixed floors for reordered names, initials
/// and names that drop a middle part.
#[derive(Debug, Clone, Copy)]
pub struct TokenBlendScorer {
    pub jaccard_weight: f64,
    pub order_weight: f64,
    pub char_weight: f64,
}

impl Default for TokenBlendScorer {
    fn default() -> Self {
        Self {
            jaccard_weight: 0.4,
            order_weight: 0.2,
            char_weight: 0.4,
        }
    }
}

impl NameScorer for TokenBlendScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let ta: Vec<&str> = a.split_whitespace().collect();
        let tb: Vec<&str> = b.split_whitespace().collect();
        if ta.is_empty() || tb.is_empty() {
            return 0.0;
        }

        let sa: BTreeSet<&str> = ta.iter().copied().collect();
        let sb: BTreeSet<&str> = tb.iter().copied().collect();
        let jaccard = sa.intersection(&sb).count() as f64 / sa.union(&sb).count() as f64;
        let order = ta.iter().zip(&tb).filter(|(x, y)| x == y).count() as f64
            / ta.len().max(tb.len()) as f64;
        let chars = jaro_similarity(a.chars(), b.chars());
        let total_weight = self.jaccard_weight + self.order_weight + self.char_weight;
        let mut score = if total_weight > 0.0 {
            (self.jaccard_weight * jaccard + self.order_weight * order + self.char_weight * chars)
                / total_weight
        } else {
            chars
        };

        if is_permutation(&ta, &tb) {
            score = score.max(PERMUTATION_FLOOR);
        }
        if initials_match(&ta, &tb) {
            score = score.max(INITIALS_FLOOR);
        }
        if let Some(floor) = subset_floor(&sa, &sb) {
            score = score.max(floor);
        }
        score.clamp(0.0, NON_IDENTICAL_CEILING)
    }
}

fn is_permutation(a: &[&str], b: &[&str]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Same token count, every pair equal or an initial of the other, and at
/// least one full word shared (`j smith` ~ `john smith`).
fn initials_match(a: &[&str], b: &[&str]) -> bool {
    if a.len() != b.len() || a.len() < 2 {
        return false;
    }
    let mut shared_word = false;
    for (x, y) in a.iter().zip(b) {
        if x == y {
            shared_word |= x.len() > 1;
        } else if !is_initial_of(x, y) && !is_initial_of(y, x) {
            return false;
        }
    }
    shared_word
}

fn is_initial_of(initial: &str, word: &str) -> bool {
    initial.len() == 1 && word.len() > 1 && word.starts_with(initial)
}

fn subset_floor(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> Option<f64> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if small.len() == large.len() || !small.is_subset(large) {
        return None;
    }
    if !small.iter().any(|token| token.len() > 1) {
        return None;
    }
    Some(if small.len() >= 2 {
        MULTI_TOKEN_SUBSET_FLOOR
    } else {
        SINGLE_TOKEN_SUBSET_FLOOR
    })
}
