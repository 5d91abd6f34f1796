//! Embedded reference data.
//!
//! The default metric catalog is compiled in with `include_str!()` so a
//! registry can be built without touching the filesystem.

// =============================================================================
// Metric catalog
// =============================================================================

/// Default canonical metric catalog (TOML).
pub const METRICS_TOML: &str = include_str!("../data/metrics.toml");

/// Label used in error messages for the embedded catalog.
pub const METRICS_TOML_LABEL: &str = "<embedded>/metrics.toml";
