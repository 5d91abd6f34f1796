//! Derived metric evaluation for one row.

use std::collections::{BTreeMap, BTreeSet};

use gps_model::{CanonicalRow, MetricCode, RowWarning, WarningKind};
use gps_standards::MetricRegistry;

use crate::options::DerivedPolicy;

/// Derived metrics a run evaluates, in dependency order.
pub fn derived_plan(
    registry: &MetricRegistry,
    mapped: &BTreeSet<MetricCode>,
    policy: DerivedPolicy,
) -> Vec<MetricCode> {
    // Source metrics each derived metric ultimately reads.
    let mut leaves: BTreeMap<&MetricCode, BTreeSet<MetricCode>> = BTreeMap::new();
    for code in registry.derived_order() {
        let Some(formula) = registry.formula(code) else {
            continue;
        };
        let mut own = BTreeSet::new();
        for reference in formula.references() {
            match leaves.get(&reference) {
                Some(inner) => own.extend(inner.iter().cloned()),
                None => {
                    own.insert(reference);
                }
            }
        }
        leaves.insert(code, own);
    }

    registry
        .derived_order()
        .iter()
        .filter(|code| {
            registry
                .lookup(code.as_str())
                .is_some_and(|metric| metric.is_active)
        })
        .filter(|code| match policy {
            DerivedPolicy::All => true,
            DerivedPolicy::Mapped => leaves
                .get(code)
                .is_some_and(|inputs| inputs.is_subset(mapped)),
        })
        .cloned()
        .collect()
}

/// Evaluates `plan` against the row's values.
///
/// A metric that cannot be computed is added to `unavailable` with one
/// warning; it never aborts the row.
pub fn apply_derived(row: &mut CanonicalRow, plan: &[MetricCode], registry: &MetricRegistry) {
    for code in plan {
        let Some(formula) = registry.formula(code) else {
            continue;
        };
        match formula.evaluate(|input| row.values.get(input).copied()) {
            Ok(value) => {
                row.values.insert(code.clone(), value);
            }
            Err(err) => {
                row.unavailable.insert(code.clone());
                row.warnings.push(
                    RowWarning::new(WarningKind::DerivedUnavailable, format!("{code}: {err}"))
                        .with_metric(code),
                );
            }
        }
    }
}
