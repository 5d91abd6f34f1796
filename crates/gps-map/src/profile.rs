//! Report profiles and their guarded editor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use gps_model::{ColumnMapping, GpsSystem, MappingKey, MetricCode};
use gps_standards::{MetricRegistry, UnitTable};

use crate::engine::{MappingResult, Suggestion, SuggestionEngine};
use crate::error::{MappingError, Result};

/// Column mapping profile for one vendor export layout.
///
/// Rows are only changed through a [`ProfileEditor`], which checks the
/// version token the caller last saw. Each successful mutation bumps the
/// version once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord")]
pub struct ReportProfile {
    pub id: String,
    pub gps_system: GpsSystem,
    #[serde(default)]
    version: u64,
    #[serde(default)]
    columns: Vec<ColumnMapping>,
}

/// Serialized shape of a profile, checked before it becomes a
/// [`ReportProfile`].
#[derive(Deserialize)]
struct ProfileRecord {
    id: String,
    gps_system: GpsSystem,
    #[serde(default)]
    version: u64,
    #[serde(default)]
    columns: Vec<ColumnMapping>,
}

impl TryFrom<ProfileRecord> for ReportProfile {
    type Error = MappingError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        let mut profile = Self::from_columns(record.id, record.gps_system, record.columns)?;
        profile.version = record.version;
        Ok(profile)
    }
}

impl ReportProfile {
    pub fn new(id: impl Into<String>, gps_system: GpsSystem) -> Self {
        Self {
            id: id.into(),
            gps_system,
            version: 0,
            columns: Vec::new(),
        }
    }

    /// Builds a profile from existing rows, rejecting duplicate keys.
    pub fn from_columns(
        id: impl Into<String>,
        gps_system: GpsSystem,
        columns: Vec<ColumnMapping>,
    ) -> Result<Self> {
        let mut profile = Self::new(id, gps_system);
        for column in columns {
            let key = column.key();
            if profile.column(&key).is_some() {
                return Err(MappingError::DuplicateColumn { key });
            }
            profile.columns.push(column);
        }
        Ok(profile)
    }

    /// Profile drafted from a suggestion pass over a sample file.
    pub fn from_suggestions(
        id: impl Into<String>,
        gps_system: GpsSystem,
        result: MappingResult,
    ) -> Result<Self> {
        Self::from_columns(id, gps_system, result.columns)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn column(&self, key: &MappingKey) -> Option<&ColumnMapping> {
        self.columns.iter().find(|column| column.key() == *key)
    }

    /// Rows that carry a canonical metric.
    pub fn mapped_columns(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.columns.iter().filter(|column| column.is_mapped())
    }

    /// Row feeding `code`, if any.
    pub fn column_for_metric(&self, code: &MetricCode) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|column| column.canonical_metric.as_ref() == Some(code))
    }

    /// Opens an editor if `expected_version` is still current.
    pub fn edit<'a>(
        &'a mut self,
        expected_version: u64,
        registry: &'a MetricRegistry,
        units: &'a UnitTable,
    ) -> Result<ProfileEditor<'a>> {
        if expected_version != self.version {
            return Err(MappingError::VersionConflict {
                expected: expected_version,
                actual: self.version,
            });
        }
        Ok(ProfileEditor {
            profile: self,
            registry,
            units,
        })
    }
}

/// Outcome of an operation that respects row locks.
///
/// A refusal is an ordinary value: the profile is left untouched and the
/// version is not bumped.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Guarded<T> {
    Applied(T),
    Refused(RefusalReason),
}

impl<T> Guarded<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Refused(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    Locked,
}

/// Result of [`ProfileEditor::remove_where`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRemoval {
    pub removed: Vec<ColumnMapping>,
    /// Locked rows that matched the predicate and were kept.
    pub refused: Vec<MappingKey>,
}

/// Exclusive editing session over a profile.
pub struct ProfileEditor<'a> {
    profile: &'a mut ReportProfile,
    registry: &'a MetricRegistry,
    units: &'a UnitTable,
}

impl ProfileEditor<'_> {
    pub fn profile(&self) -> &ReportProfile {
        self.profile
    }

    pub fn version(&self) -> u64 {
        self.profile.version
    }

    fn bump(&mut self) {
        self.profile.version += 1;
    }

    fn position(&self, key: &MappingKey) -> Result<usize> {
        self.profile
            .columns
            .iter()
            .position(|column| column.key() == *key)
            .ok_or_else(|| MappingError::ColumnNotFound { key: key.clone() })
    }

    fn ensure_free(&self, key: &MappingKey, except: usize) -> Result<()> {
        let taken = self
            .profile
            .columns
            .iter()
            .enumerate()
            .any(|(idx, column)| idx != except && column.key() == *key);
        if taken {
            return Err(MappingError::DuplicateColumn { key: key.clone() });
        }
        Ok(())
    }

    /// Asks the engine for a target. Locked rows are refused without
    /// consulting it.
    pub fn suggest(
        &self,
        key: &MappingKey,
        engine: &SuggestionEngine<'_>,
    ) -> Result<Guarded<Option<Suggestion>>> {
        let column = &self.profile.columns[self.position(key)?];
        if column.locked {
            return Ok(Guarded::Refused(RefusalReason::Locked));
        }
        Ok(Guarded::Applied(engine.suggest_canonical(&column.mapped_column)))
    }

    /// Applies the engine's suggestion to an unlocked row.
    ///
    /// Returns the row's new key, or `None` when the engine had nothing.
    pub fn apply_suggestion(
        &mut self,
        key: &MappingKey,
        engine: &SuggestionEngine<'_>,
    ) -> Result<Guarded<Option<MappingKey>>> {
        let suggestion = match self.suggest(key, engine)? {
            Guarded::Refused(reason) => return Ok(Guarded::Refused(reason)),
            Guarded::Applied(None) => return Ok(Guarded::Applied(None)),
            Guarded::Applied(Some(suggestion)) => suggestion,
        };
        let idx = self.position(key)?;
        let new_key = self.assign(idx, suggestion.metric, suggestion.source_unit)?;
        Ok(Guarded::Applied(Some(new_key)))
    }

    /// Points a row at a canonical metric, optionally declaring the source
    /// unit. Returns the row's new key.
    pub fn set_mapping(
        &mut self,
        key: &MappingKey,
        metric: &str,
        unit: Option<&str>,
    ) -> Result<MappingKey> {
        let idx = self.position(key)?;
        if self.profile.columns[idx].locked {
            return Err(MappingError::Locked { key: key.clone() });
        }
        let registry = self.registry;
        let metric = registry
            .lookup(metric)
            .ok_or_else(|| MappingError::UnknownMetric {
                code: metric.to_string(),
            })?;
        if metric.is_derived {
            return Err(MappingError::DerivedTarget {
                code: metric.code.clone(),
            });
        }
        let source_unit = unit
            .map(|unit| {
                self.units
                    .resolve(metric.dimension, unit)
                    .map(|def| def.code.to_string())
                    .ok_or_else(|| MappingError::InvalidUnit {
                        metric: metric.code.clone(),
                        unit: unit.to_string(),
                        dimension: metric.dimension,
                    })
            })
            .transpose()?;
        self.assign(idx, metric.code.clone(), source_unit)
    }

    fn assign(
        &mut self,
        idx: usize,
        code: MetricCode,
        source_unit: Option<String>,
    ) -> Result<MappingKey> {
        let new_key = MappingKey::new(
            Some(code.clone()),
            self.profile.columns[idx].mapped_column.clone(),
        );
        self.ensure_free(&new_key, idx)?;
        let allowed_display = self
            .registry
            .lookup(code.as_str())
            .map(|metric| self.units.allowed_display_units(metric))
            .unwrap_or_default();
        let column = &mut self.profile.columns[idx];
        column.canonical_metric = Some(code);
        column.source_unit = source_unit;
        if column
            .display_unit
            .as_deref()
            .is_some_and(|unit| !allowed_display.contains(&unit))
        {
            column.display_unit = None;
        }
        self.bump();
        debug!(key = %new_key, version = self.profile.version, "column mapped");
        Ok(new_key)
    }

    /// Drops a row's canonical target. Locked rows are refused.
    pub fn clear_mapping(&mut self, key: &MappingKey) -> Result<Guarded<MappingKey>> {
        let idx = self.position(key)?;
        if self.profile.columns[idx].locked {
            return Ok(Guarded::Refused(RefusalReason::Locked));
        }
        let new_key = MappingKey::unmapped(key.mapped_column.clone());
        self.ensure_free(&new_key, idx)?;
        let column = &mut self.profile.columns[idx];
        column.canonical_metric = None;
        column.source_unit = None;
        column.display_unit = None;
        self.bump();
        Ok(Guarded::Applied(new_key))
    }

    pub fn lock(&mut self, key: &MappingKey) -> Result<()> {
        self.set_locked(key, true)
    }

    pub fn unlock(&mut self, key: &MappingKey) -> Result<()> {
        self.set_locked(key, false)
    }

    fn set_locked(&mut self, key: &MappingKey, locked: bool) -> Result<()> {
        let idx = self.position(key)?;
        if self.profile.columns[idx].locked != locked {
            self.profile.columns[idx].locked = locked;
            self.bump();
        }
        Ok(())
    }

    /// Changes the display name. Allowed on locked rows.
    pub fn rename(&mut self, key: &MappingKey, display_name: impl Into<String>) -> Result<()> {
        let idx = self.position(key)?;
        self.profile.columns[idx].display_name = display_name.into();
        self.bump();
        Ok(())
    }

    /// Sets the unit values are shown in. Allowed on locked rows.
    pub fn set_display_unit(&mut self, key: &MappingKey, unit: Option<&str>) -> Result<()> {
        let idx = self.position(key)?;
        let display_unit = match unit {
            None => None,
            Some(unit) => {
                let metric = self.profile.columns[idx]
                    .canonical_metric
                    .as_ref()
                    .and_then(|code| self.registry.lookup(code.as_str()))
                    .ok_or_else(|| MappingError::NotMapped { key: key.clone() })?;
                let resolved = self
                    .units
                    .resolve(metric.dimension, unit)
                    .map(|def| def.code)
                    .filter(|code| self.units.allowed_display_units(metric).contains(code))
                    .ok_or_else(|| MappingError::InvalidUnit {
                        metric: metric.code.clone(),
                        unit: unit.to_string(),
                        dimension: metric.dimension,
                    })?;
                Some(resolved.to_string())
            }
        };
        self.profile.columns[idx].display_unit = display_unit;
        self.bump();
        Ok(())
    }

    pub fn set_visible(&mut self, key: &MappingKey, visible: bool) -> Result<()> {
        let idx = self.position(key)?;
        if self.profile.columns[idx].is_visible != visible {
            self.profile.columns[idx].is_visible = visible;
            self.bump();
        }
        Ok(())
    }

    /// Adds an unmapped row for `mapped_column`.
    pub fn add_column(&mut self, mapped_column: impl Into<String>) -> Result<MappingKey> {
        let column = ColumnMapping::new(mapped_column);
        let key = column.key();
        if self.profile.column(&key).is_some() {
            return Err(MappingError::DuplicateColumn { key });
        }
        self.profile.columns.push(column);
        self.bump();
        Ok(key)
    }

    /// Removes a row. Locked rows are refused.
    pub fn remove(&mut self, key: &MappingKey) -> Result<Guarded<ColumnMapping>> {
        let idx = self.position(key)?;
        if self.profile.columns[idx].locked {
            return Ok(Guarded::Refused(RefusalReason::Locked));
        }
        let removed = self.profile.columns.remove(idx);
        self.bump();
        Ok(Guarded::Applied(removed))
    }

    /// Removes every unlocked row matching `predicate`; locked matches are
    /// reported back.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&ColumnMapping) -> bool) -> BulkRemoval {
        let mut outcome = BulkRemoval::default();
        let mut kept = Vec::with_capacity(self.profile.columns.len());
        for column in self.profile.columns.drain(..) {
            if !predicate(&column) {
                kept.push(column);
            } else if column.locked {
                outcome.refused.push(column.key());
                kept.push(column);
            } else {
                outcome.removed.push(column);
            }
        }
        self.profile.columns = kept;
        if !outcome.removed.is_empty() {
            self.bump();
        }
        outcome
    }

    /// Locks every mapped row once the profile has fed an import.
    ///
    /// Returns how many rows became locked.
    pub fn mark_used(&mut self) -> usize {
        let mut newly_locked = 0;
        for column in &mut self.profile.columns {
            if column.is_mapped() && !column.locked {
                column.locked = true;
                newly_locked += 1;
            }
        }
        if newly_locked > 0 {
            self.bump();
        }
        newly_locked
    }
}
