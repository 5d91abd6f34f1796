//! File-system repository for report profiles.
//!
//! Profiles are stored as pretty-printed JSON named
//! `{gps_system}_{profile_id}.json`. Saving checks the stored version so two
//! sessions editing the same profile cannot silently overwrite each other.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use gps_model::GpsSystem;

use crate::error::MappingError;
use crate::profile::ReportProfile;

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    base_dir: PathBuf,
}

impl ProfileRepository {
    /// Opens a repository, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!("failed to create profile repository: {}", base_dir.display())
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn profile_path(&self, gps_system: &GpsSystem, id: &str) -> PathBuf {
        self.base_dir.join(format!(
            "{}_{}.json",
            file_component(gps_system.as_str()),
            file_component(id)
        ))
    }

    /// Writes a profile.
    ///
    /// `base_version` is the version the edit started from. If the stored
    /// copy has moved past it, the save is rejected with
    /// [`MappingError::VersionConflict`].
    pub fn save(&self, profile: &ReportProfile, base_version: Option<u64>) -> Result<PathBuf> {
        let path = self.profile_path(&profile.gps_system, &profile.id);
        if let Some(expected) = base_version
            && let Some(stored) = self.load(&profile.gps_system, &profile.id)?
            && stored.version() != expected
        {
            return Err(MappingError::VersionConflict {
                expected,
                actual: stored.version(),
            }
            .into());
        }
        let json = serde_json::to_string_pretty(profile).context("failed to serialize profile")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write profile: {}", path.display()))?;
        info!(
            profile = %profile.id,
            version = profile.version(),
            path = %path.display(),
            "profile saved"
        );
        Ok(path)
    }

    /// Loads a profile by system and id. Returns `None` if it is not stored.
    pub fn load(&self, gps_system: &GpsSystem, id: &str) -> Result<Option<ReportProfile>> {
        let path = self.profile_path(gps_system, id);
        if !path.exists() {
            return Ok(None);
        }
        load_profile_file(&path).map(Some)
    }

    /// Lists every stored profile, sorted by file name.
    pub fn list(&self) -> Result<Vec<ReportProfile>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.base_dir)
            .with_context(|| format!("failed to read directory: {}", self.base_dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        debug!(count = paths.len(), "listing stored profiles");
        paths.iter().map(|path| load_profile_file(path)).collect()
    }

    pub fn delete(&self, gps_system: &GpsSystem, id: &str) -> Result<bool> {
        let path = self.profile_path(gps_system, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("failed to delete profile: {}", path.display()))?;
        Ok(true)
    }
}

/// Reads one profile JSON file.
pub fn load_profile_file(path: &Path) -> Result<ReportProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse profile: {}", path.display()))
}

fn file_component(raw: &str) -> String {
    raw.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let repo = ProfileRepository::new(dir.path()).unwrap();
        let path = repo.profile_path(&GpsSystem::new("STATSports Apex").unwrap(), "u21/match");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "STATSports_Apex_u21_match.json"
        );
    }
}
