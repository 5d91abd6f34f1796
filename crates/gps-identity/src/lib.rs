//! Player identity matching for GPS reports.
//!
//! Resolves the raw athlete names found in vendor exports to roster players.
//! A remembered mapping always wins; otherwise names are normalized, scored
//! against the roster and sorted into auto-confirm, needs-review or
//! unresolved.
//!
//! # Features
//!
//! - **Normalization**: transliteration, diacritic and punctuation folding.
//! - **Scoring**: pluggable [`NameScorer`] with a token-blend default.
//! - **Memory**: scoped mapping snapshot with administrator reset.

#![deny(unsafe_code)]

pub mod error;
pub mod matcher;
pub mod memory;
pub mod normalize;
pub mod score;

// === Matching ===
pub use matcher::{
    DEFAULT_CONFIDENT_THRESHOLD, DEFAULT_REVIEW_THRESHOLD, MatchAction, MatchOutcome,
    MatchThresholds, PlayerMatcher,
};
pub use score::{JaroWinklerScorer, NameScorer, TokenBlendScorer};

// === Memory ===
pub use memory::{MappingMemory, ResetFilter};

// === Normalization ===
pub use normalize::{name_orders, normalize_name};

// === Errors ===
pub use error::{IdentityError, Result};
