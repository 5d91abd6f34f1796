use std::io::Write;

use gps_model::{Dimension, MetricCategory};
use gps_standards::{MetricRegistry, StandardsError, UnitTable};

#[test]
fn default_catalog_loads_and_is_grouped_in_display_order() {
    let units = UnitTable::standard();
    let registry = MetricRegistry::load_default(&units).unwrap();
    assert!(!registry.is_empty());

    let groups = registry.all_active();
    let categories: Vec<MetricCategory> = groups.iter().map(|(category, _)| *category).collect();
    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
    assert_eq!(categories.first(), Some(&MetricCategory::Identity));
    assert_eq!(categories.last(), Some(&MetricCategory::Other));

    let speed = registry.lookup("max_speed").unwrap();
    assert_eq!(speed.dimension, Dimension::Speed);
    assert_eq!(speed.canonical_unit, "m/s");
    assert!(registry.lookup("no_such_metric").is_none());
}

#[test]
fn default_derived_order_respects_dependencies() {
    let units = UnitTable::standard();
    let registry = MetricRegistry::load_default(&units).unwrap();
    let order: Vec<&str> = registry.derived_order().iter().map(|c| c.as_str()).collect();
    let pos = |code: &str| order.iter().position(|c| *c == code).unwrap();
    assert!(pos("high_intensity_distance") < pos("high_intensity_per_min"));
    assert_eq!(order.len(), 5);
    for code in registry.derived_order() {
        assert!(registry.formula(code).is_some(), "{code}");
        assert!(registry.lookup(code.as_str()).unwrap().is_derived);
    }
}

#[test]
fn cycles_are_rejected_at_load() {
    let text = r#"
[registry]
version = "cyclic"

[[metrics]]
code = "a"
name = "A"
category = "derived"
dimension = "count"
canonical_unit = "count"
is_derived = true
formula = "b + 1"

[[metrics]]
code = "b"
name = "B"
category = "derived"
dimension = "count"
canonical_unit = "count"
is_derived = true
formula = "c * 2"

[[metrics]]
code = "c"
name = "C"
category = "derived"
dimension = "count"
canonical_unit = "count"
is_derived = true
formula = "a - 1"
"#;
    let err = MetricRegistry::from_toml_str(text, "cyclic.toml", &UnitTable::standard())
        .unwrap_err();
    assert!(matches!(err, StandardsError::CyclicFormula { .. }));
    insta::assert_snapshot!(err.to_string(), @"cyclic formula: a -> b -> c -> a");
}

#[test]
fn self_reference_is_a_cycle() {
    let text = r#"
[registry]
version = "self"

[[metrics]]
code = "loop_metric"
name = "Loop"
category = "derived"
dimension = "count"
canonical_unit = "count"
is_derived = true
formula = "loop_metric + 1"
"#;
    let err = MetricRegistry::from_toml_str(text, "self.toml", &UnitTable::standard())
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"cyclic formula: loop_metric -> loop_metric");
}

#[test]
fn loads_catalog_from_path_and_reports_parse_errors() {
    let units = UnitTable::standard();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[registry]\nversion = \"club-1\"\n\n[[metrics]]\ncode = \"total_distance\"\nname = \"TD\"\ncategory = \"distance\"\ndimension = \"distance\"\ncanonical_unit = \"km\"\n"
    )
    .unwrap();
    let registry = MetricRegistry::load_from_path(file.path(), &units).unwrap();
    assert_eq!(registry.version(), "club-1");
    assert_eq!(registry.len(), 1);

    let mut broken = tempfile::NamedTempFile::new().unwrap();
    writeln!(broken, "[registry\nversion = 1").unwrap();
    let err = MetricRegistry::load_from_path(broken.path(), &units).unwrap_err();
    assert!(matches!(err, StandardsError::Toml { .. }));

    let missing = file.path().with_extension("missing");
    assert!(matches!(
        MetricRegistry::load_from_path(&missing, &units),
        Err(StandardsError::Io { .. })
    ));
}
