//! Source fingerprints and stored payloads.

use sha2::{Digest, Sha256};

use gps_model::{CANONICAL_IMPORT_VERSION, CanonicalImport, CanonicalOutput, StoredReport};
use gps_standards::MetricRegistry;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Wraps a run's output in the current stored-report version, stamped with
/// the registry version and the source file's hash.
pub fn store_canonical(
    output: CanonicalOutput,
    source: &[u8],
    registry: &MetricRegistry,
) -> StoredReport {
    StoredReport::Canonical(CanonicalImport {
        version: CANONICAL_IMPORT_VERSION,
        registry_version: registry.version().to_string(),
        source_sha256: sha256_hex(source),
        output,
    })
}
