#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use gps_model::{CanonicalMetric, MetricCategory, MetricCode};

use crate::embedded::{METRICS_TOML, METRICS_TOML_LABEL};
use crate::error::StandardsError;
use crate::formula::Formula;
use crate::units::UnitTable;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryMeta {
    pub version: String,
}

/// On-disk shape of a metric catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub registry: RegistryMeta,
    #[serde(default)]
    pub metrics: Vec<CanonicalMetric>,
}

/// Validated, read-only catalog of canonical metrics.
///
/// Construction checks units against the [`UnitTable`], parses every
/// formula, rejects unknown references and reference cycles, and precomputes
/// the evaluation order of derived metrics. There is no mutation path after
/// construction.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    version: String,
    metrics: Vec<CanonicalMetric>,
    index: BTreeMap<String, usize>,
    formulas: BTreeMap<MetricCode, Formula>,
    derived_order: Vec<MetricCode>,
}

impl MetricRegistry {
    /// Builds the registry from the embedded default catalog.
    pub fn load_default(units: &UnitTable) -> Result<Self, StandardsError> {
        Self::from_toml_str(METRICS_TOML, METRICS_TOML_LABEL, units)
    }

    pub fn load_from_path(path: &Path, units: &UnitTable) -> Result<Self, StandardsError> {
        let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
        Self::from_toml_str(&text, path, units)
    }

    pub fn from_toml_str(
        text: &str,
        origin: impl AsRef<Path>,
        units: &UnitTable,
    ) -> Result<Self, StandardsError> {
        let config: RegistryConfig = toml::from_str(text).map_err(|source| StandardsError::Toml {
            path: origin.as_ref().to_path_buf(),
            source,
        })?;
        Self::build(config, units)
    }

    pub fn build(config: RegistryConfig, units: &UnitTable) -> Result<Self, StandardsError> {
        let mut metrics = Vec::with_capacity(config.metrics.len());
        let mut index = BTreeMap::new();
        for metric in config.metrics {
            let metric = normalize_units(metric, units)?;
            if index.contains_key(metric.code.as_str()) {
                return Err(StandardsError::DuplicateMetric { code: metric.code });
            }
            index.insert(metric.code.as_str().to_string(), metrics.len());
            metrics.push(metric);
        }

        let mut formulas = BTreeMap::new();
        for metric in &metrics {
            if let Some(formula) = parse_formula(metric)? {
                for reference in formula.references() {
                    let Some(target) = index.get(reference.as_str()).map(|idx| &metrics[*idx])
                    else {
                        return Err(StandardsError::UnknownReference {
                            code: metric.code.clone(),
                            reference,
                        });
                    };
                    if !target.is_numeric() {
                        return Err(StandardsError::InvalidMetric {
                            code: metric.code.clone(),
                            message: format!("formula references text metric {reference}"),
                        });
                    }
                }
                formulas.insert(metric.code.clone(), formula);
            }
        }

        let derived_order = topological_order(&formulas)?;
        debug!(
            version = %config.registry.version,
            metrics = metrics.len(),
            derived = derived_order.len(),
            "metric registry loaded"
        );
        Ok(Self {
            version: config.registry.version,
            metrics,
            index,
            formulas,
            derived_order,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn lookup(&self, code: &str) -> Option<&CanonicalMetric> {
        self.index.get(code.trim()).map(|idx| &self.metrics[*idx])
    }

    /// All metrics in declaration order, active or not.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalMetric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Active metrics grouped by category in display order.
    ///
    /// Empty categories are omitted; metrics keep declaration order within a
    /// group.
    pub fn all_active(&self) -> Vec<(MetricCategory, Vec<&CanonicalMetric>)> {
        MetricCategory::DISPLAY_ORDER
            .into_iter()
            .filter_map(|category| {
                let group: Vec<&CanonicalMetric> = self
                    .metrics
                    .iter()
                    .filter(|metric| metric.is_active && metric.category == category)
                    .collect();
                (!group.is_empty()).then_some((category, group))
            })
            .collect()
    }

    /// Derived metrics ordered so every formula's inputs come first.
    pub fn derived_order(&self) -> &[MetricCode] {
        &self.derived_order
    }

    pub fn formula(&self, code: &MetricCode) -> Option<&Formula> {
        self.formulas.get(code)
    }
}

/// Checks units against the table and rewrites aliases to table codes.
fn normalize_units(
    mut metric: CanonicalMetric,
    units: &UnitTable,
) -> Result<CanonicalMetric, StandardsError> {
    let dimension = metric.dimension;
    let resolve = |unit: &str| {
        units
            .resolve(dimension, unit)
            .map(|def| def.code.to_string())
            .ok_or_else(|| StandardsError::UnknownUnit {
                code: metric.code.clone(),
                unit: unit.to_string(),
                dimension,
            })
    };
    let canonical = resolve(&metric.canonical_unit)?;
    let supported = metric
        .supported_units
        .iter()
        .map(|unit| resolve(unit))
        .collect::<Result<Vec<_>, _>>()?;
    let display = metric
        .display_units
        .iter()
        .map(|unit| resolve(unit))
        .collect::<Result<Vec<_>, _>>()?;
    metric.canonical_unit = canonical;
    metric.supported_units = supported;
    metric.display_units = display;
    Ok(metric)
}

fn parse_formula(metric: &CanonicalMetric) -> Result<Option<Formula>, StandardsError> {
    match (&metric.formula, metric.is_derived) {
        (None, false) => Ok(None),
        (None, true) => Err(StandardsError::MissingFormula {
            code: metric.code.clone(),
        }),
        (Some(_), false) => Err(StandardsError::InvalidMetric {
            code: metric.code.clone(),
            message: "formula given on a metric that is not derived".to_string(),
        }),
        (Some(_), true) if !metric.is_numeric() => Err(StandardsError::InvalidMetric {
            code: metric.code.clone(),
            message: "derived metrics must be numeric".to_string(),
        }),
        (Some(source), true) => Formula::parse(source)
            .map(Some)
            .map_err(|source| StandardsError::Formula {
                code: metric.code.clone(),
                source,
            }),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first post-order over derived metrics; inputs precede dependents.
fn topological_order(
    formulas: &BTreeMap<MetricCode, Formula>,
) -> Result<Vec<MetricCode>, StandardsError> {
    let mut marks: BTreeMap<&MetricCode, Mark> = BTreeMap::new();
    let mut order = Vec::with_capacity(formulas.len());
    let mut stack: Vec<&MetricCode> = Vec::new();
    for code in formulas.keys() {
        visit(code, formulas, &mut marks, &mut stack, &mut order)?;
    }
    Ok(order)
}

fn visit<'a>(
    code: &'a MetricCode,
    formulas: &'a BTreeMap<MetricCode, Formula>,
    marks: &mut BTreeMap<&'a MetricCode, Mark>,
    stack: &mut Vec<&'a MetricCode>,
    order: &mut Vec<MetricCode>,
) -> Result<(), StandardsError> {
    match marks.get(code) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => {
            let start = stack.iter().position(|entry| *entry == code).unwrap_or(0);
            let mut cycle: Vec<MetricCode> = stack[start..].iter().map(|c| (*c).clone()).collect();
            cycle.push(code.clone());
            return Err(StandardsError::CyclicFormula { cycle });
        }
        None => {}
    }
    let Some((key, formula)) = formulas.get_key_value(code) else {
        // Plain (non-derived) input.
        return Ok(());
    };
    marks.insert(key, Mark::Visiting);
    stack.push(key);
    let references: BTreeSet<MetricCode> = formula.references();
    for reference in &references {
        if let Some((dep, _)) = formulas.get_key_value(reference) {
            visit(dep, formulas, marks, stack, order)?;
        }
    }
    stack.pop();
    marks.insert(key, Mark::Done);
    order.push(key.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_from(body: &str) -> Result<MetricRegistry, StandardsError> {
        let text = format!("[registry]\nversion = \"test\"\n{body}");
        MetricRegistry::from_toml_str(&text, "test.toml", &UnitTable::standard())
    }

    const BASE: &str = r#"
[[metrics]]
code = "total_distance"
name = "Total distance"
category = "distance"
dimension = "distance"
canonical_unit = "m"

[[metrics]]
code = "duration"
name = "Duration"
category = "participation"
dimension = "time"
canonical_unit = "mins"
"#;

    #[test]
    fn unit_aliases_are_normalized() {
        let registry = registry_from(BASE).unwrap();
        assert_eq!(registry.lookup("duration").unwrap().canonical_unit, "min");
    }

    #[test]
    fn rejects_duplicate_codes() {
        let err = registry_from(&format!("{BASE}{BASE}")).unwrap_err();
        assert!(matches!(err, StandardsError::DuplicateMetric { .. }), "{err}");
    }

    #[test]
    fn rejects_units_outside_dimension() {
        let body = r#"
[[metrics]]
code = "max_speed"
name = "Max speed"
category = "speed"
dimension = "speed"
canonical_unit = "m"
"#;
        let err = registry_from(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "metric max_speed: unit \"m\" is not a speed unit"
        );
    }

    #[test]
    fn rejects_unknown_references_and_missing_formulas() {
        let body = format!(
            "{BASE}\n[[metrics]]\ncode = \"pace\"\nname = \"Pace\"\ncategory = \"derived\"\ndimension = \"speed\"\ncanonical_unit = \"m/min\"\nis_derived = true\nformula = \"total_distance / minutes_played\"\n"
        );
        assert!(matches!(
            registry_from(&body).unwrap_err(),
            StandardsError::UnknownReference { .. }
        ));

        let body = format!(
            "{BASE}\n[[metrics]]\ncode = \"pace\"\nname = \"Pace\"\ncategory = \"derived\"\ndimension = \"speed\"\ncanonical_unit = \"m/min\"\nis_derived = true\n"
        );
        assert!(matches!(
            registry_from(&body).unwrap_err(),
            StandardsError::MissingFormula { .. }
        ));
    }

    #[test]
    fn derived_order_puts_inputs_first() {
        let body = format!(
            "{BASE}
[[metrics]]
code = \"z_per_min\"
name = \"Per minute\"
category = \"derived\"
dimension = \"speed\"
canonical_unit = \"m/min\"
is_derived = true
formula = \"a_double / duration\"

[[metrics]]
code = \"a_double\"
name = \"Double\"
category = \"derived\"
dimension = \"distance\"
canonical_unit = \"m\"
is_derived = true
formula = \"total_distance * 2\"
"
        );
        let registry = registry_from(&body).unwrap();
        let order: Vec<&str> = registry.derived_order().iter().map(MetricCode::as_str).collect();
        assert_eq!(order, vec!["a_double", "z_per_min"]);
    }
}
