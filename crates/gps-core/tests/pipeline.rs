use gps_core::{
    Canonicalizer, DerivedPolicy, DuplicateHeaderPolicy, PipelineError, PipelineOptions,
    ReportInput, sha256_hex, store_canonical,
};
use gps_identity::MappingMemory;
use gps_ingest::{IngestError, ParsedReport, SourceFormat};
use gps_map::ReportProfile;
use gps_model::{
    ClubId, ColumnMapping, GpsSystem, MappingType, MatchScope, MetricCode, PlayerId,
    PlayerMapping, PlayerResolution, ResolutionSource, RosterPlayer, StoredReport, TeamId,
    WarningKind,
};
use gps_standards::{MetricRegistry, UnitTable};

struct Fixture {
    units: UnitTable,
    registry: MetricRegistry,
    scope: MatchScope,
    roster: Vec<RosterPlayer>,
}

impl Fixture {
    fn new() -> Self {
        let units = UnitTable::standard();
        let registry = MetricRegistry::load_default(&units).unwrap();
        Self {
            units,
            registry,
            scope: MatchScope {
                club_id: ClubId::new("club-a").unwrap(),
                team_id: TeamId::new("first-team").unwrap(),
                gps_system: GpsSystem::new("Catapult").unwrap(),
            },
            roster: vec![
                player("P1", "John", "Smith"),
                player("P2", "Ivan", "Petrov"),
                player("P3", "Luka", "Modric"),
            ],
        }
    }

    fn remember(&self, raw: &str, player: &str) -> PlayerMapping {
        PlayerMapping {
            raw_name: raw.to_string(),
            club_id: self.scope.club_id.clone(),
            team_id: self.scope.team_id.clone(),
            gps_system: self.scope.gps_system.clone(),
            player_id: PlayerId::new(player).unwrap(),
            confidence_score: 1.0,
            mapping_type: MappingType::Manual,
            notes: None,
        }
    }

    fn canonicalizer(&self, options: PipelineOptions) -> Canonicalizer<'_> {
        Canonicalizer::with_options(&self.registry, &self.units, options)
    }
}

fn player(id: &str, first: &str, last: &str) -> RosterPlayer {
    RosterPlayer {
        id: PlayerId::new(id).unwrap(),
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

fn mapped(header: &str, metric: &str, unit: Option<&str>) -> ColumnMapping {
    let mut column = ColumnMapping::new(header);
    column.canonical_metric = Some(MetricCode::new(metric).unwrap());
    column.source_unit = unit.map(str::to_string);
    column
}

fn profile(columns: Vec<ColumnMapping>) -> ReportProfile {
    ReportProfile::from_columns("catapult", GpsSystem::new("Catapult").unwrap(), columns).unwrap()
}

fn smith_profile() -> ReportProfile {
    profile(vec![
        mapped("Player", "athlete_name", None),
        mapped("Total Distance (m)", "total_distance", Some("m")),
        mapped("Max Speed (km/h)", "max_speed", Some("km/h")),
    ])
}

fn input<'a>(
    fx: &'a Fixture,
    bytes: &'a [u8],
    profile: &'a ReportProfile,
    memory: &'a MappingMemory,
) -> ReportInput<'a> {
    ReportInput {
        bytes,
        format: SourceFormat::Csv,
        profile,
        roster: &fx.roster,
        memory,
        scope: &fx.scope,
    }
}

#[test]
fn remembered_initials_resolve_with_converted_values() {
    let fx = Fixture::new();
    let mut memory = MappingMemory::new();
    memory.confirm(fx.remember("J. Smith", "P1"));
    let profile = smith_profile();
    let bytes = b"Player,Total Distance (m),Max Speed (km/h)\nJ. Smith,5400,28.8\n";

    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();

    assert_eq!(output.rows.len(), 1);
    let row = &output.rows[0];
    assert_eq!(
        row.player,
        PlayerResolution::Resolved {
            player_id: PlayerId::new("P1").unwrap(),
            confidence: 1.0,
            source: ResolutionSource::Memory,
        }
    );
    assert_eq!(row.values.len(), 2);
    assert_eq!(row.value("total_distance"), Some(5400.0));
    assert!((row.value("max_speed").unwrap() - 8.0).abs() < 1e-9);
    assert!(row.warnings.is_empty());
    assert_eq!(output.diagnostics.warning_count, 0);
    assert_eq!(output.diagnostics.resolved_count, 1);
    assert!(output.new_player_mapping_suggestions.is_empty());
}

const MESSY: &[u8] = b"Catapult Session Export\n\
Player,Position,Duration,Total Distance (m),Max Speed (km/h)\n\
John Smith,MF,90,10200,31.5\n\
Petrov Ivan,DF,88,abc,29.0\n\
Modric,MF,-,9800,\n\
Trialist,FW,45,4100,27\n\
,,,,\n\
Average,,,8000,29\n";

fn messy_profile() -> ReportProfile {
    profile(vec![
        mapped("Player", "athlete_name", None),
        mapped("Position", "position", None),
        mapped("Duration", "duration", None),
        mapped("Total Distance (m)", "total_distance", None),
        mapped("Max Speed (km/h)", "max_speed", None),
    ])
}

#[test]
fn runs_are_deterministic() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = messy_profile();
    let canonicalizer = fx.canonicalizer(PipelineOptions::default());
    let first = canonicalizer
        .run(&input(&fx, MESSY, &profile, &memory))
        .unwrap();
    let second = canonicalizer
        .run(&input(&fx, MESSY, &profile, &memory))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn row_problems_become_warnings() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = messy_profile();
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, MESSY, &profile, &memory))
        .unwrap();

    assert_eq!(output.rows.len(), 4, "blank and summary rows are dropped");
    assert_eq!(output.diagnostics.skipped_summary_rows, 1);

    let smith = &output.rows[0];
    assert_eq!(smith.player.player_id(), Some(&PlayerId::new("P1").unwrap()));
    assert_eq!(smith.labels[&MetricCode::new("position").unwrap()], "MF");
    assert_eq!(smith.value("duration"), Some(90.0));
    assert!((smith.value("distance_per_min").unwrap() - 10200.0 / 90.0).abs() < 1e-9);

    let petrov = &output.rows[1];
    assert_eq!(petrov.player.player_id(), Some(&PlayerId::new("P2").unwrap()));
    assert_eq!(petrov.value("total_distance"), None, "malformed is never zero");
    let kinds: Vec<WarningKind> = petrov.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![WarningKind::MalformedCell, WarningKind::DerivedUnavailable]
    );
    assert_eq!(
        petrov.warnings[0].column.as_deref(),
        Some("Total Distance (m)")
    );

    let modric = &output.rows[2];
    assert!(matches!(modric.player, PlayerResolution::PendingReview { .. }));
    assert_eq!(modric.value("max_speed"), None);
    assert!(modric.unavailable.contains(&MetricCode::new("distance_per_min").unwrap()));

    let trialist = &output.rows[3];
    assert_eq!(trialist.player, PlayerResolution::Unresolved);
    assert!(trialist
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::UnresolvedPlayer));

    let diagnostics = &output.diagnostics;
    assert_eq!(diagnostics.resolved_count, 2);
    assert_eq!(diagnostics.unresolved_count, 2);
    let row_warnings: usize = output.rows.iter().map(|r| r.warnings.len()).sum();
    assert_eq!(diagnostics.warning_count, row_warnings);

    assert_eq!(output.new_player_mapping_suggestions.len(), 2);
    assert_eq!(output.new_player_mapping_suggestions[0].raw_name, "John Smith");
    assert_eq!(output.pending_reviews.len(), 1);
    assert_eq!(output.pending_reviews[0].raw_name, "Modric");
    assert_eq!(
        output.pending_reviews[0].candidates[0].player_id,
        PlayerId::new("P3").unwrap()
    );
}

#[test]
fn derived_metrics_degrade_gracefully() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = smith_profile();
    let bytes = b"Player,Total Distance (m),Max Speed (km/h)\nJohn Smith,5400,28.8\n";
    let options = PipelineOptions {
        derived: DerivedPolicy::All,
        ..PipelineOptions::default()
    };
    let output = fx
        .canonicalizer(options)
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();
    let row = &output.rows[0];
    let per_min = MetricCode::new("distance_per_min").unwrap();
    assert!(row.unavailable.contains(&per_min));
    assert_eq!(row.value("distance_per_min"), None);
    for code in &row.unavailable {
        let count = row
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DerivedUnavailable && w.metric.as_ref() == Some(code))
            .count();
        assert_eq!(count, 1, "{code}");
    }
}

#[test]
fn memory_beats_a_closer_fuzzy_match() {
    let fx = Fixture::new();
    let mut memory = MappingMemory::new();
    memory.confirm(fx.remember("John Smith", "P3"));
    let profile = smith_profile();
    let bytes = b"Player,Total Distance (m),Max Speed (km/h)\nJohn Smith,5400,28.8\n";
    let canonicalizer = fx.canonicalizer(PipelineOptions::default());
    for _ in 0..3 {
        let output = canonicalizer
            .run(&input(&fx, bytes, &profile, &memory))
            .unwrap();
        assert_eq!(
            output.rows[0].player.player_id(),
            Some(&PlayerId::new("P3").unwrap())
        );
        assert!(output.new_player_mapping_suggestions.is_empty());
    }
}

#[test]
fn missing_headers_are_reported() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let mut columns = smith_profile().columns().to_vec();
    columns.push(mapped("Sprints", "sprints_count", None));
    let profile = profile(columns);
    let bytes = b"Player,Total Distance (m),Max Speed (km/h)\nJohn Smith,5400,28.8\n";
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();
    assert_eq!(
        output.diagnostics.missing_headers,
        vec![MetricCode::new("sprints_count").unwrap()]
    );
    assert_eq!(output.diagnostics.report_warnings.len(), 1);
    assert_eq!(output.diagnostics.warning_count, 1);
}

#[test]
fn first_column_wins_when_two_map_one_metric() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = profile(vec![
        mapped("Player", "athlete_name", None),
        mapped("Distance (m)", "total_distance", Some("m")),
        mapped("Distance (km)", "total_distance", Some("km")),
    ]);
    let bytes = b"Player,Distance (m),Distance (km)\nJohn Smith,5400,6.1\n";
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();
    assert_eq!(output.rows[0].value("total_distance"), Some(5400.0));
    assert_eq!(output.diagnostics.report_warnings.len(), 1);
    assert!(output.diagnostics.report_warnings[0].contains("Distance (km)"));
    assert_eq!(output.diagnostics.warning_count, 1);
}

#[test]
fn spreadsheet_percent_fractions_are_scaled() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = profile(vec![
        mapped("Player", "athlete_name", None),
        mapped("HSR %", "hsr_percentage", Some("%")),
    ]);
    let parsed = ParsedReport {
        headers: vec!["Player".to_string(), "HSR %".to_string()],
        rows: vec![
            vec!["John Smith".to_string(), "0.125".to_string()],
            vec!["Ivan Petrov".to_string(), "14".to_string()],
        ],
        ..ParsedReport::default()
    };
    let mut spreadsheet = input(&fx, b"", &profile, &memory);
    spreadsheet.format = SourceFormat::Spreadsheet;
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run_parsed(&parsed, &spreadsheet)
        .unwrap();
    assert!((output.rows[0].value("hsr_percentage").unwrap() - 12.5).abs() < 1e-9);
    assert!((output.rows[1].value("hsr_percentage").unwrap() - 14.0).abs() < 1e-9);
    assert!(output.rows.iter().all(|row| row.warnings.is_empty()));
}

#[test]
fn headers_match_case_insensitively_and_names_fall_back() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = profile(vec![mapped("Total Distance (m)", "total_distance", Some("m"))]);
    let bytes = b"Athlete,total  distance (m)\nIvan Petrov,7000\n";
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();
    let row = &output.rows[0];
    assert_eq!(row.value("total_distance"), Some(7000.0));
    assert_eq!(row.raw_name.as_deref(), Some("Ivan Petrov"));
    assert_eq!(row.player.player_id(), Some(&PlayerId::new("P2").unwrap()));
}

#[test]
fn duplicate_headers_follow_the_policy() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = smith_profile();
    let bytes =
        b"Player,Total Distance (m),Max Speed (km/h),Total Distance (m)\nJohn Smith,5400,28.8,1\n";

    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();
    assert_eq!(output.rows[0].value("total_distance"), Some(5400.0));
    assert_eq!(output.diagnostics.report_warnings.len(), 1);

    let options = PipelineOptions {
        duplicate_headers: DuplicateHeaderPolicy::Reject,
        ..PipelineOptions::default()
    };
    let err = fx
        .canonicalizer(options)
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @r#"duplicate header "Total Distance (m)" at columns 2 and 4"#
    );
}

#[test]
fn row_limit_and_parse_errors_stop_the_run() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = smith_profile();
    let bytes = b"Player,Total Distance (m)\nA,1\nB,2\n";
    let options = PipelineOptions {
        max_rows: Some(1),
        ..PipelineOptions::default()
    };
    assert!(matches!(
        fx.canonicalizer(options)
            .run(&input(&fx, bytes, &profile, &memory))
            .unwrap_err(),
        PipelineError::ResourceExhausted { rows: 2, limit: 1 }
    ));

    let utf16 = [0xFF, 0xFE, b'P', 0];
    assert!(matches!(
        fx.canonicalizer(PipelineOptions::default())
            .run(&input(&fx, &utf16, &profile, &memory))
            .unwrap_err(),
        PipelineError::Ingest(IngestError::UnsupportedEncoding { .. })
    ));
}

#[test]
fn stored_payload_carries_hash_and_registry_version() {
    let fx = Fixture::new();
    let memory = MappingMemory::new();
    let profile = smith_profile();
    let bytes = b"Player,Total Distance (m),Max Speed (km/h)\nJohn Smith,5400,28.8\n";
    let output = fx
        .canonicalizer(PipelineOptions::default())
        .run(&input(&fx, bytes, &profile, &memory))
        .unwrap();

    let stored = store_canonical(output.clone(), bytes, &fx.registry);
    let parsed = StoredReport::from_json(&stored.to_json_pretty().unwrap()).unwrap();
    match &parsed {
        StoredReport::Canonical(import) => {
            assert_eq!(import.source_sha256, sha256_hex(bytes));
            assert_eq!(import.registry_version, fx.registry.version());
        }
        other => panic!("expected canonical payload, got {other:?}"),
    }
    assert_eq!(parsed.current_canonical(), Some(&output));
}
