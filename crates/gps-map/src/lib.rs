//! Column mapping for GPS reports.
//!
//! Maps vendor export headers onto canonical metrics and keeps the result as
//! an editable [`ReportProfile`].
//!
//! # Features
//!
//! - **Suggestions**: alias lookup, zone patterns and fuzzy matching of
//!   headers, with the source unit read from the header text.
//! - **Profiles**: versioned column mappings edited through a
//!   [`ProfileEditor`] that never overrides a locked row.
//! - **Diffs**: row-level comparison of two profile revisions.
//! - **Repository**: JSON persistence with a stale-write check.

#![deny(unsafe_code)]

pub mod diff;
pub mod engine;
pub mod error;
pub mod patterns;
pub mod profile;
pub mod repository;
pub mod utils;

// === Suggestions ===
pub use engine::{MappingResult, MatchReason, Suggestion, SuggestionEngine};
pub use patterns::{AliasIndex, match_quick_pattern};

// === Profiles ===
pub use diff::{ChangedField, ColumnChange, ProfileDiff, diff_profiles};
pub use profile::{BulkRemoval, Guarded, ProfileEditor, RefusalReason, ReportProfile};
pub use repository::{ProfileRepository, load_profile_file};

// === Errors ===
pub use error::{MappingError, Result};

// === Utilities ===
pub use utils::{normalize_header, split_unit_suffix};
