//! The canonicalization run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, info_span, warn};

use gps_identity::{MappingMemory, MatchAction, MatchOutcome, PlayerMatcher};
use gps_ingest::{ParsedReport, SourceFormat, parse_report};
use gps_map::ReportProfile;
use gps_model::{
    CanonicalMetric, CanonicalOutput, CanonicalRow, ColumnMapping, Diagnostics, MatchScope,
    MetricCode, PlayerResolution, ReviewItem, RosterPlayer, RowWarning, WarningKind,
};
use gps_standards::{MetricRegistry, UnitTable};

use crate::derive::{apply_derived, derived_plan};
use crate::error::{PipelineError, Result};
use crate::extract::{CellValue, read_cell, source_unit};
use crate::headers::HeaderIndex;
use crate::options::PipelineOptions;

const ATHLETE_NAME: &str = "athlete_name";

/// Everything one run reads. The pipeline does no I/O of its own.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub bytes: &'a [u8],
    pub format: SourceFormat,
    pub profile: &'a ReportProfile,
    pub roster: &'a [RosterPlayer],
    pub memory: &'a MappingMemory,
    pub scope: &'a MatchScope,
}

/// A profile column bound to its position in the file.
struct BoundColumn<'a> {
    position: usize,
    column: &'a ColumnMapping,
    metric: &'a CanonicalMetric,
    unit: &'a str,
}

/// Turns vendor reports into canonical rows.
///
/// Holds only shared references to the registry and unit table, so one
/// instance can serve any number of runs.
pub struct Canonicalizer<'a> {
    registry: &'a MetricRegistry,
    units: &'a UnitTable,
    options: PipelineOptions,
    matcher: PlayerMatcher,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(registry: &'a MetricRegistry, units: &'a UnitTable) -> Self {
        Self::with_options(registry, units, PipelineOptions::default())
    }

    pub fn with_options(
        registry: &'a MetricRegistry,
        units: &'a UnitTable,
        options: PipelineOptions,
    ) -> Self {
        Self {
            registry,
            units,
            options,
            matcher: PlayerMatcher::new(options.thresholds),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Parses the input bytes and canonicalizes them.
    pub fn run(&self, input: &ReportInput<'_>) -> Result<CanonicalOutput> {
        let span = info_span!(
            "canonicalize",
            profile = %input.profile.id,
            format = %input.format
        );
        let _guard = span.enter();
        let parsed = parse_report(input.bytes, input.format)?;
        self.run_parsed(&parsed, input)
    }

    /// Canonicalizes an already parsed report. `input.bytes` is not read.
    pub fn run_parsed(&self, parsed: &ParsedReport, input: &ReportInput<'_>) -> Result<CanonicalOutput> {
        if let Some(limit) = self.options.max_rows
            && parsed.rows.len() > limit
        {
            return Err(PipelineError::ResourceExhausted {
                rows: parsed.rows.len(),
                limit,
            });
        }

        let headers = HeaderIndex::build(&parsed.headers, self.options.duplicate_headers)?;
        let mut diagnostics = Diagnostics {
            skipped_summary_rows: parsed.skipped_summary,
            report_warnings: headers.warnings.clone(),
            ..Diagnostics::default()
        };

        let (bound, name_position) = self.bind_columns(input.profile, &headers, &mut diagnostics);
        let mapped: BTreeSet<MetricCode> = bound
            .iter()
            .map(|column| column.metric.code.clone())
            .collect();
        let plan = derived_plan(self.registry, &mapped, self.options.derived);
        debug!(
            rows = parsed.rows.len(),
            columns = bound.len(),
            derived = plan.len(),
            "columns bound"
        );

        let mut outcomes: BTreeMap<String, MatchOutcome> = BTreeMap::new();
        let mut first_seen: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(parsed.rows.len());
        for (idx, cells) in parsed.rows.iter().enumerate() {
            let raw_name = name_position
                .and_then(|position| cells.get(position))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);
            let mut row = CanonicalRow {
                row_index: idx + 1,
                raw_name: raw_name.clone(),
                player: PlayerResolution::Unresolved,
                values: BTreeMap::new(),
                labels: BTreeMap::new(),
                unavailable: BTreeSet::new(),
                warnings: Vec::new(),
            };

            match &raw_name {
                Some(name) => {
                    let outcome = outcomes.entry(name.clone()).or_insert_with(|| {
                        first_seen.push(name.clone());
                        self.matcher
                            .resolve(name, input.scope, input.memory, input.roster)
                    });
                    row.player = outcome.resolution();
                    if let Some(warning) = identity_warning(outcome) {
                        row.warnings.push(warning);
                    }
                }
                None if name_position.is_some() => row.warnings.push(RowWarning::new(
                    WarningKind::MissingName,
                    "row has no athlete name",
                )),
                None => {}
            }

            self.read_values(&mut row, cells, &bound, input.format);
            apply_derived(&mut row, &plan, self.registry);
            rows.push(row);
        }

        let mut suggestions = Vec::new();
        let mut reviews = Vec::new();
        for name in &first_seen {
            let Some(outcome) = outcomes.get(name) else {
                continue;
            };
            match outcome.action {
                MatchAction::AutoConfirm => suggestions.extend(outcome.proposed_mapping()),
                MatchAction::NeedsReview => reviews.push(ReviewItem {
                    raw_name: outcome.raw_name.clone(),
                    candidates: outcome
                        .best
                        .iter()
                        .chain(&outcome.alternatives)
                        .cloned()
                        .collect(),
                }),
                MatchAction::Memory | MatchAction::Unresolved => {}
            }
        }

        diagnostics.resolved_count = rows.iter().filter(|row| row.player.is_resolved()).count();
        diagnostics.unresolved_count = rows.len() - diagnostics.resolved_count;
        diagnostics.warning_count = rows.iter().map(|row| row.warnings.len()).sum::<usize>()
            + diagnostics.report_warnings.len();
        info!(
            rows = rows.len(),
            resolved = diagnostics.resolved_count,
            unresolved = diagnostics.unresolved_count,
            warnings = diagnostics.warning_count,
            missing_headers = diagnostics.missing_headers.len(),
            "report canonicalized"
        );

        Ok(CanonicalOutput {
            rows,
            diagnostics,
            new_player_mapping_suggestions: suggestions,
            pending_reviews: reviews,
        })
    }

    /// Finds each mapped profile column in the file.
    ///
    /// Returns the numeric and label columns plus the athlete name position.
    /// A metric is read from the first column that maps it; later columns
    /// mapping the same metric are reported and ignored.
    fn bind_columns<'p>(
        &self,
        profile: &'p ReportProfile,
        headers: &HeaderIndex,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<BoundColumn<'p>>, Option<usize>)
    where
        'a: 'p,
    {
        let mut bound = Vec::new();
        let mut name_position = None;
        let mut bound_codes: BTreeMap<&MetricCode, &str> = BTreeMap::new();
        for column in profile.mapped_columns() {
            let Some(code) = column.canonical_metric.as_ref() else {
                continue;
            };
            let Some(metric) = self.registry.lookup(code.as_str()) else {
                warn!(metric = %code, "profile maps a metric missing from the registry");
                diagnostics
                    .report_warnings
                    .push(format!("profile metric {code} is not in the registry"));
                continue;
            };
            if !metric.is_active || metric.is_derived {
                continue;
            }
            let Some(position) = headers.position(&column.mapped_column) else {
                warn!(metric = %code, header = %column.mapped_column, "expected header missing");
                if !diagnostics.missing_headers.contains(code) {
                    diagnostics.missing_headers.push(code.clone());
                }
                diagnostics.report_warnings.push(format!(
                    "expected header {:?} for {code} not found",
                    column.mapped_column
                ));
                continue;
            };
            if metric.code == ATHLETE_NAME {
                name_position.get_or_insert(position);
                continue;
            }
            if let Some(first) = bound_codes.get(&metric.code) {
                warn!(metric = %code, header = %column.mapped_column, "metric mapped twice");
                diagnostics.report_warnings.push(format!(
                    "{code} is already read from {first:?}; column {:?} ignored",
                    column.mapped_column
                ));
                continue;
            }
            bound_codes.insert(&metric.code, column.mapped_column.as_str());
            bound.push(BoundColumn {
                position,
                column,
                metric,
                unit: source_unit(column, metric, self.units),
            });
        }
        if name_position.is_none() {
            name_position = headers.name_fallback();
            if name_position.is_none() {
                diagnostics
                    .report_warnings
                    .push("no athlete name column; rows are unresolved".to_string());
            }
        }
        (bound, name_position)
    }

    fn read_values(
        &self,
        row: &mut CanonicalRow,
        cells: &[String],
        bound: &[BoundColumn<'_>],
        format: SourceFormat,
    ) {
        for binding in bound {
            let Some(cell) = cells.get(binding.position) else {
                continue;
            };
            let code = &binding.metric.code;
            if !binding.metric.is_numeric() {
                let text = cell.trim();
                if !text.is_empty() {
                    row.labels.insert(code.clone(), text.to_string());
                }
                continue;
            }
            match read_cell(cell, binding.unit, binding.metric, self.units, format) {
                CellValue::Absent => {}
                CellValue::Value(value) => {
                    if !binding.metric.is_plausible(value) {
                        row.warnings.push(
                            RowWarning::new(
                                WarningKind::Implausible,
                                format!(
                                    "{code} = {value} {} is outside the plausible range",
                                    binding.metric.canonical_unit
                                ),
                            )
                            .with_metric(code)
                            .with_column(binding.column.mapped_column.as_str()),
                        );
                    }
                    row.values.insert(code.clone(), value);
                }
                CellValue::Malformed(err) => row.warnings.push(
                    RowWarning::new(WarningKind::MalformedCell, err.to_string())
                        .with_metric(code)
                        .with_column(binding.column.mapped_column.as_str()),
                ),
            }
        }
    }
}

fn identity_warning(outcome: &MatchOutcome) -> Option<RowWarning> {
    match outcome.action {
        MatchAction::Memory | MatchAction::AutoConfirm => None,
        MatchAction::NeedsReview => Some(RowWarning::new(
            WarningKind::PendingReview,
            format!(
                "player match needs review (best score {:.2})",
                outcome.confidence()
            ),
        )),
        MatchAction::Unresolved => Some(RowWarning::new(
            WarningKind::UnresolvedPlayer,
            "no roster player matched",
        )),
    }
}
