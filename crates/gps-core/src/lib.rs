//! GPS report canonicalization pipeline.
//!
//! Parses a vendor export, resolves every row's athlete, converts mapped
//! columns to canonical units and computes derived metrics. The output is a
//! deterministic function of the file bytes, profile, roster and mapping
//! memory snapshot.
//!
//! # Features
//!
//! - **Header binding**: exact then case-insensitive header lookup with a
//!   configurable duplicate-header policy.
//! - **Row conversion**: malformed cells become warnings and stay absent.
//! - **Derived metrics**: evaluated in registry dependency order.
//! - **Stored payloads**: SHA-256 stamped, versioned canonical imports.

#![deny(unsafe_code)]

pub mod derive;
pub mod error;
pub mod extract;
pub mod hash;
pub mod headers;
pub mod options;
pub mod pipeline;

// === Pipeline ===
pub use options::{DEFAULT_MAX_ROWS, DerivedPolicy, DuplicateHeaderPolicy, PipelineOptions};
pub use pipeline::{Canonicalizer, ReportInput};

// === Storage ===
pub use hash::{sha256_hex, store_canonical};

// === Errors ===
pub use error::{PipelineError, Result};
