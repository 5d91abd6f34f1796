//! Row-level comparison of two profile revisions.

use std::collections::BTreeMap;

use serde::Serialize;

use gps_model::{ColumnMapping, MappingKey};

use crate::profile::ReportProfile;

/// Field of a row that differs between revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangedField {
    SourceUnit,
    DisplayName,
    DisplayUnit,
    Locked,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChange {
    pub key: MappingKey,
    pub fields: Vec<ChangedField>,
}

/// Added, removed and changed rows, keyed by [`MappingKey`] and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileDiff {
    pub added: Vec<MappingKey>,
    pub removed: Vec<MappingKey>,
    pub changed: Vec<ColumnChange>,
}

impl ProfileDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

pub fn diff_profiles(before: &ReportProfile, after: &ReportProfile) -> ProfileDiff {
    let old = by_key(before);
    let new = by_key(after);
    let mut diff = ProfileDiff::default();
    for (key, column) in &new {
        match old.get(key) {
            None => diff.added.push(key.clone()),
            Some(previous) => {
                let fields = changed_fields(previous, column);
                if !fields.is_empty() {
                    diff.changed.push(ColumnChange {
                        key: key.clone(),
                        fields,
                    });
                }
            }
        }
    }
    diff.removed = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .cloned()
        .collect();
    diff
}

fn by_key(profile: &ReportProfile) -> BTreeMap<MappingKey, &ColumnMapping> {
    profile
        .columns()
        .iter()
        .map(|column| (column.key(), column))
        .collect()
}

fn changed_fields(before: &ColumnMapping, after: &ColumnMapping) -> Vec<ChangedField> {
    let mut fields = Vec::new();
    if before.source_unit != after.source_unit {
        fields.push(ChangedField::SourceUnit);
    }
    if before.display_name != after.display_name {
        fields.push(ChangedField::DisplayName);
    }
    if before.display_unit != after.display_unit {
        fields.push(ChangedField::DisplayUnit);
    }
    if before.locked != after.locked {
        fields.push(ChangedField::Locked);
    }
    if before.is_visible != after.is_visible {
        fields.push(ChangedField::Visible);
    }
    fields
}
