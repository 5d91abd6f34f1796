//! Remembered raw-name -> player associations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use gps_model::{ClubId, GpsSystem, MatchScope, PlayerMapping, TeamId};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MemoryKey {
    scope: MatchScope,
    raw_name: String,
}

impl MemoryKey {
    fn new(scope: MatchScope, raw_name: &str) -> Self {
        Self {
            scope,
            raw_name: key_name(raw_name),
        }
    }

    fn of(mapping: &PlayerMapping) -> Self {
        Self::new(mapping.scope(), &mapping.raw_name)
    }
}

/// Raw names are compared as written, apart from surrounding and repeated
/// whitespace.
fn key_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Snapshot of player mappings keyed by (club, team, gps system, raw name).
///
/// Serializes as a plain JSON array of [`PlayerMapping`] in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerMapping>", into = "Vec<PlayerMapping>")]
pub struct MappingMemory {
    entries: BTreeMap<MemoryKey, PlayerMapping>,
}

impl From<Vec<PlayerMapping>> for MappingMemory {
    fn from(mappings: Vec<PlayerMapping>) -> Self {
        let mut memory = Self::default();
        for mapping in mappings {
            memory.confirm(mapping);
        }
        memory
    }
}

impl From<MappingMemory> for Vec<PlayerMapping> {
    fn from(memory: MappingMemory) -> Self {
        memory.entries.into_values().collect()
    }
}

impl MappingMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerMapping> {
        self.entries.values()
    }

    pub fn lookup(&self, raw_name: &str, scope: &MatchScope) -> Option<&PlayerMapping> {
        self.entries.get(&MemoryKey::new(scope.clone(), raw_name))
    }

    /// Inserts or replaces the mapping for its key; returns the previous one.
    pub fn confirm(&mut self, mapping: PlayerMapping) -> Option<PlayerMapping> {
        self.entries.insert(MemoryKey::of(&mapping), mapping)
    }

    /// Mappings in one scope.
    pub fn active_for<'a>(
        &'a self,
        scope: &'a MatchScope,
    ) -> impl Iterator<Item = &'a PlayerMapping> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.scope == *scope)
            .map(|(_, mapping)| mapping)
    }

    /// Deletes the mappings selected by `filter` and returns them.
    ///
    /// The filter always names one club and one team; mappings of any other
    /// club are never touched.
    pub fn reset(&mut self, filter: &ResetFilter) -> Vec<PlayerMapping> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|(_, mapping)| filter.matches(mapping));
        self.entries = kept.into_iter().collect();
        info!(
            club = %filter.club_id,
            team = %filter.team_id,
            removed = removed.len(),
            "player mappings reset"
        );
        removed.into_iter().map(|(_, mapping)| mapping).collect()
    }
}

/// Selection for an administrator reset of player mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetFilter {
    pub club_id: ClubId,
    pub team_id: TeamId,
    pub gps_system: Option<GpsSystem>,
    /// Case-insensitive substring of the raw report name.
    pub name_contains: Option<String>,
}

impl ResetFilter {
    pub fn new(club_id: ClubId, team_id: TeamId) -> Self {
        Self {
            club_id,
            team_id,
            gps_system: None,
            name_contains: None,
        }
    }

    #[must_use]
    pub fn with_gps_system(mut self, gps_system: GpsSystem) -> Self {
        self.gps_system = Some(gps_system);
        self
    }

    #[must_use]
    pub fn with_name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, mapping: &PlayerMapping) -> bool {
        mapping.club_id == self.club_id
            && mapping.team_id == self.team_id
            && self
                .gps_system
                .as_ref()
                .is_none_or(|system| mapping.gps_system == *system)
            && self.name_contains.as_ref().is_none_or(|needle| {
                mapping
                    .raw_name
                    .to_lowercase()
                    .contains(&needle.trim().to_lowercase())
            })
    }
}
