use std::collections::BTreeMap;

use gps_map::{MatchReason, SuggestionEngine};
use gps_model::ColumnHint;
use gps_standards::{MetricRegistry, UnitTable};

fn fixtures() -> (MetricRegistry, UnitTable) {
    let units = UnitTable::standard();
    let registry = MetricRegistry::load_default(&units).unwrap();
    (registry, units)
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn aliases_resolve_with_units_from_the_header() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);

    let speed = engine.suggest_canonical("Max Speed (km/h)").unwrap();
    assert_eq!(speed.metric, "max_speed");
    assert_eq!(speed.source_unit.as_deref(), Some("km/h"));
    assert_eq!(speed.reason, MatchReason::Alias);
    assert_eq!(speed.confidence, 1.0);

    let player = engine.suggest_canonical("Player").unwrap();
    assert_eq!(player.metric, "athlete_name");
    assert_eq!(player.source_unit, None);

    let russian = engine.suggest_canonical("Общая дистанция, км").unwrap();
    assert_eq!(russian.metric, "total_distance");
    assert_eq!(russian.source_unit.as_deref(), Some("km"));
}

#[test]
fn percent_headers_prefer_the_percentage_metric() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);
    let suggestion = engine.suggest_canonical("HSR %").unwrap();
    assert_eq!(suggestion.metric, "hsr_percentage");
    assert_eq!(suggestion.source_unit.as_deref(), Some("%"));
    assert_eq!(engine.suggest_canonical("HSR (m)").unwrap().metric, "hsr_distance");
}

#[test]
fn zone_patterns_and_typos() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);

    let zone = engine.suggest_canonical("Dist Zone4 [m]").unwrap();
    assert_eq!(zone.metric, "distance_zone4");
    assert_eq!(zone.reason, MatchReason::Pattern);

    let typo = engine.suggest_canonical("Total Distanse (m)").unwrap();
    assert_eq!(typo.metric, "total_distance");
    assert_eq!(typo.reason, MatchReason::Fuzzy);
    assert!(typo.confidence < 1.0);
}

#[test]
fn derived_metrics_and_noise_are_not_suggested() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);
    let derived = engine.suggest_canonical("distance_per_min");
    assert!(derived.is_none_or(|s| s.metric != "distance_per_min"));
    assert_eq!(engine.suggest_canonical("Coach Comments"), None);
    assert_eq!(engine.suggest_canonical(""), None);
}

#[test]
fn unit_from_another_dimension_lowers_confidence() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);
    assert_eq!(engine.suggest_canonical("Distance (km/h)"), None);
    let relaxed = SuggestionEngine::new(&registry, &units).with_min_confidence(0.5);
    let suggestion = relaxed.suggest_canonical("Distance (km/h)").unwrap();
    assert_eq!(suggestion.metric, "total_distance");
    assert_eq!(suggestion.source_unit, None);
}

#[test]
fn profile_assignment_is_one_to_one() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);
    let headers = headers(&[
        "Player",
        "Distance (m)",
        "Total Distance (km)",
        "Max Speed (km/h)",
        "Player",
        "Comments",
    ]);
    let result = engine.suggest_profile(&headers, &BTreeMap::new());

    assert_eq!(result.columns.len(), 5, "repeated header considered once");
    let targets: Vec<Option<&str>> = result
        .columns
        .iter()
        .map(|column| column.canonical_metric.as_ref().map(|code| code.as_str()))
        .collect();
    assert_eq!(
        targets,
        vec![
            Some("athlete_name"),
            Some("total_distance"),
            None,
            Some("max_speed"),
            None
        ]
    );
    assert_eq!(result.unmapped_columns, vec!["Total Distance (km)", "Comments"]);
    assert_eq!(result.columns[3].display_unit.as_deref(), Some("km/h"));
    assert_eq!(result.columns[1].source_unit.as_deref(), Some("m"));
}

#[test]
fn identity_metrics_skip_numeric_columns() {
    let (registry, units) = fixtures();
    let engine = SuggestionEngine::new(&registry, &units);
    let headers = headers(&["Name", "Distance"]);
    let mut hints = BTreeMap::new();
    hints.insert(
        "Name".to_string(),
        ColumnHint {
            is_numeric: true,
            null_ratio: 0.0,
        },
    );
    let result = engine.suggest_profile(&headers, &hints);
    assert!(result.columns[0].canonical_metric.is_none());
    assert_eq!(result.unmapped_columns, vec!["Name"]);
}
