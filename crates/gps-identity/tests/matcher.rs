use gps_identity::{
    IdentityError, MappingMemory, MatchAction, MatchThresholds, PlayerMatcher, ResetFilter,
};
use gps_model::{
    ClubId, GpsSystem, MappingType, MatchScope, PlayerId, PlayerMapping, PlayerResolution,
    ResolutionSource, RosterPlayer, TeamId,
};

fn player(id: &str, first: &str, last: &str) -> RosterPlayer {
    RosterPlayer {
        id: PlayerId::new(id).unwrap(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

fn roster() -> Vec<RosterPlayer> {
    vec![
        player("P1", "John", "Smith"),
        player("P2", "Ivan", "Petrov"),
        player("P3", "Jonas", "Schmidt"),
        player("P4", "Luka", "Modric"),
    ]
}

fn scope(club: &str) -> MatchScope {
    MatchScope {
        club_id: ClubId::new(club).unwrap(),
        team_id: TeamId::new("U21").unwrap(),
        gps_system: GpsSystem::new("Catapult").unwrap(),
    }
}

fn remembered(raw: &str, player: &str, scope: &MatchScope) -> PlayerMapping {
    PlayerMapping {
        raw_name: raw.to_string(),
        club_id: scope.club_id.clone(),
        team_id: scope.team_id.clone(),
        gps_system: scope.gps_system.clone(),
        player_id: PlayerId::new(player).unwrap(),
        confidence_score: 1.0,
        mapping_type: MappingType::Manual,
        notes: None,
    }
}

#[test]
fn memory_hit_is_terminal() {
    let scope = scope("club-a");
    let mut memory = MappingMemory::new();
    memory.confirm(remembered("J. Smith", "P1", &scope));

    let outcome = PlayerMatcher::default().resolve(" J.  Smith ", &scope, &memory, &roster());
    assert_eq!(outcome.action, MatchAction::Memory);
    assert_eq!(outcome.confidence(), 1.0);
    assert_eq!(
        outcome.resolution(),
        PlayerResolution::Resolved {
            player_id: PlayerId::new("P1").unwrap(),
            confidence: 1.0,
            source: ResolutionSource::Memory,
        }
    );
    assert_eq!(outcome.proposed_mapping(), None);
}

#[test]
fn memory_outranks_a_better_fuzzy_candidate() {
    let scope = scope("club-a");
    let mut memory = MappingMemory::new();
    // Deliberately not the closest name on the roster.
    memory.confirm(remembered("John Smith", "P3", &scope));
    let matcher = PlayerMatcher::default();
    for _ in 0..3 {
        let outcome = matcher.resolve("John Smith", &scope, &memory, &roster());
        assert_eq!(outcome.player_id(), Some(&PlayerId::new("P3").unwrap()));
    }
}

#[test]
fn memory_for_a_departed_player_falls_back_to_scoring() {
    let scope = scope("club-a");
    let mut memory = MappingMemory::new();
    memory.confirm(remembered("John Smith", "P9", &scope));
    let outcome = PlayerMatcher::default().resolve("John Smith", &scope, &memory, &roster());
    assert_eq!(outcome.action, MatchAction::AutoConfirm);
    assert_eq!(outcome.player_id(), Some(&PlayerId::new("P1").unwrap()));
}

#[test]
fn memory_is_scoped_per_club() {
    let mut memory = MappingMemory::new();
    memory.confirm(remembered("Smith", "P3", &scope("club-a")));
    let outcome = PlayerMatcher::default().resolve("Smith", &scope("club-b"), &memory, &roster());
    assert_ne!(outcome.action, MatchAction::Memory);
}

#[test]
fn initials_auto_confirm_and_propose_a_mapping() {
    let scope = scope("club-a");
    let outcome =
        PlayerMatcher::default().resolve("Smith J.", &scope, &MappingMemory::new(), &roster());
    assert_eq!(outcome.action, MatchAction::AutoConfirm);
    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.player_id, PlayerId::new("P1").unwrap());
    assert!(outcome.alternatives.len() <= 3);

    let proposed = outcome.proposed_mapping().unwrap();
    assert_eq!(proposed.raw_name, "Smith J.");
    assert_eq!(proposed.mapping_type, MappingType::Auto);
    assert_eq!(proposed.scope(), scope);
}

#[test]
fn transliterated_names_match() {
    let outcome = PlayerMatcher::default().resolve(
        "Петров Иван",
        &scope("club-a"),
        &MappingMemory::new(),
        &roster(),
    );
    assert_eq!(outcome.player_id(), Some(&PlayerId::new("P2").unwrap()));
}

#[test]
fn surname_alone_needs_review() {
    let outcome =
        PlayerMatcher::default().resolve("Modric", &scope("club-a"), &MappingMemory::new(), &roster());
    assert_eq!(outcome.action, MatchAction::NeedsReview);
    assert_eq!(outcome.player_id(), None);
    assert!(matches!(
        outcome.resolution(),
        PlayerResolution::PendingReview { .. }
    ));
    assert_eq!(outcome.proposed_mapping(), None);
}

#[test]
fn strangers_stay_unresolved() {
    let outcome = PlayerMatcher::default().resolve(
        "Trialist 7",
        &scope("club-a"),
        &MappingMemory::new(),
        &roster(),
    );
    assert_eq!(outcome.action, MatchAction::Unresolved);
    assert_eq!(outcome.resolution(), PlayerResolution::Unresolved);
    assert!(outcome.best.is_none());
}

#[test]
fn ties_break_on_edit_distance_then_id() {
    let twins = vec![
        player("B", "Alex", "Moore"),
        player("A", "Alex", "Moore"),
        player("C", "Alexander", "Moore"),
    ];
    let ranked = PlayerMatcher::default().rank("Moore Alex", &twins);
    let ids: Vec<&str> = ranked.iter().map(|c| c.player_id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn tied_top_candidates_go_to_review() {
    let mut roster = roster();
    roster.push(player("P5", "Jane", "Smith"));
    let outcome =
        PlayerMatcher::default().resolve("J. Smith", &scope("club-a"), &MappingMemory::new(), &roster);
    assert_eq!(outcome.action, MatchAction::NeedsReview);
    assert_eq!(outcome.player_id(), None);
    assert_eq!(outcome.proposed_mapping(), None);
    let best = outcome.best.as_ref().unwrap();
    assert_eq!(best.player_id, PlayerId::new("P1").unwrap());
    assert_eq!(outcome.alternatives[0].player_id, PlayerId::new("P5").unwrap());
    assert!(matches!(
        outcome.resolution(),
        PlayerResolution::PendingReview { .. }
    ));
}

#[test]
fn reset_never_crosses_clubs() {
    let a = scope("club-a");
    let b = scope("club-b");
    let mut memory = MappingMemory::new();
    memory.confirm(remembered("J. Smith", "P1", &a));
    memory.confirm(remembered("I. Petrov", "P2", &a));
    memory.confirm(remembered("J. Smith", "P1", &b));

    let filter = ResetFilter::new(a.club_id.clone(), a.team_id.clone()).with_name_contains("smith");
    let removed = memory.reset(&filter);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].club_id, a.club_id);
    assert!(memory.lookup("J. Smith", &b).is_some());
    assert!(memory.lookup("I. Petrov", &a).is_some());
    assert_eq!(memory.active_for(&a).count(), 1);

    let filter = ResetFilter::new(a.club_id.clone(), a.team_id.clone())
        .with_gps_system(GpsSystem::new("STATSports").unwrap());
    assert!(memory.reset(&filter).is_empty());
}

#[test]
fn confirm_replaces_an_existing_entry() {
    let scope = scope("club-a");
    let mut memory = MappingMemory::new();
    assert!(memory.confirm(remembered("J. Smith", "P1", &scope)).is_none());
    let previous = memory.confirm(remembered("J. Smith", "P3", &scope)).unwrap();
    assert_eq!(previous.player_id.as_str(), "P1");
    assert_eq!(memory.len(), 1);

    let json = memory.to_json_pretty().unwrap();
    assert_eq!(MappingMemory::from_json(&json).unwrap(), memory);
    assert!(matches!(
        MappingMemory::from_json("{}"),
        Err(IdentityError::Memory(_))
    ));
}

#[test]
fn thresholds_are_validated() {
    assert!(MatchThresholds::new(0.9, 0.5).is_ok());
    let err = MatchThresholds::new(0.5, 0.9).unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid match thresholds: need 0 <= review (0.9) <= confident (0.5) <= 1"
    );
}
