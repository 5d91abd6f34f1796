#![deny(unsafe_code)]

//! Shared data model for GPS report canonicalization.
//!
//! Everything in this crate is plain data: identifiers, dimensions, metric
//! definitions, column and player mappings, and the canonical output of a run.
//! Behaviour lives in the `gps-standards`, `gps-map`, `gps-identity` and
//! `gps-core` crates.

pub mod dimension;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod metric;
pub mod player;
pub mod row;
pub mod stored;

pub use dimension::Dimension;
pub use error::{ModelError, Result};
pub use ids::{ClubId, GpsSystem, MetricCode, PlayerId, TeamId};
pub use mapping::{ColumnHint, ColumnMapping, MappingKey};
pub use metric::{CanonicalMetric, MetricCategory};
pub use player::{MappingType, MatchCandidate, MatchScope, PlayerMapping, RosterPlayer};
pub use row::{
    CanonicalOutput, CanonicalRow, Diagnostics, PlayerResolution, ResolutionSource, ReviewItem,
    RowWarning, WarningKind,
};
pub use stored::{CANONICAL_IMPORT_VERSION, CanonicalImport, RawImport, StoredReport};
