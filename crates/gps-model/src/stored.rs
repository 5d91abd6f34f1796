//! Versioned payloads for persisted report data.
//!
//! Stored reports are a tagged sum type. Anything that does not match a known
//! shape is kept verbatim as [`StoredReport::Legacy`] instead of being probed
//! field by field at runtime.

use serde::{Deserialize, Serialize};

use crate::{CanonicalOutput, ModelError};

/// Current schema version of [`CanonicalImport`].
pub const CANONICAL_IMPORT_VERSION: u32 = 1;

/// Parsed file contents before canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImport {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalImport {
    pub version: u32,
    pub registry_version: String,
    /// Hex SHA-256 of the uploaded bytes.
    pub source_sha256: String,
    pub output: CanonicalOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredReport {
    Raw(RawImport),
    Canonical(CanonicalImport),
    Legacy { payload: serde_json::Value },
}

impl StoredReport {
    /// Reads a stored payload, keeping unknown shapes as `Legacy`.
    ///
    /// # Errors
    ///
    /// Fails only when `json` is not valid JSON at all.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<StoredReport>(value.clone()) {
            Ok(report) => report,
            Err(_) => Self::Legacy { payload: value },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the canonical output when the payload is a current-version import.
    pub fn current_canonical(&self) -> Option<&CanonicalOutput> {
        match self {
            Self::Canonical(import) if import.version == CANONICAL_IMPORT_VERSION => {
                Some(&import.output)
            }
            _ => None,
        }
    }
}
