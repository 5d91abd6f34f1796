//! Roster players and persisted name -> player mappings.

use serde::{Deserialize, Serialize};

use crate::{ClubId, GpsSystem, PlayerId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub id: PlayerId,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
}

impl RosterPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// How a player mapping came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    /// Confirmed by a human.
    Manual,
    /// Persisted after a confident fuzzy match.
    Auto,
}

/// Tenant, team and vendor system a lookup is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchScope {
    pub club_id: ClubId,
    pub team_id: TeamId,
    pub gps_system: GpsSystem,
}

/// A remembered association between a raw report name and a roster player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMapping {
    pub raw_name: String,
    pub club_id: ClubId,
    pub team_id: TeamId,
    pub gps_system: GpsSystem,
    pub player_id: PlayerId,
    pub confidence_score: f64,
    pub mapping_type: MappingType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PlayerMapping {
    pub fn scope(&self) -> MatchScope {
        MatchScope {
            club_id: self.club_id.clone(),
            team_id: self.team_id.clone(),
            gps_system: self.gps_system.clone(),
        }
    }
}

/// A scored roster candidate for a raw name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub player_id: PlayerId,
    pub display_name: String,
    pub score: f64,
    pub edit_distance: usize,
}
