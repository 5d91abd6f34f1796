use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{debug, info, info_span};

use gps_core::{
    Canonicalizer, DerivedPolicy, DuplicateHeaderPolicy, PipelineOptions, ReportInput,
    store_canonical,
};
use gps_identity::{
    DEFAULT_CONFIDENT_THRESHOLD, DEFAULT_REVIEW_THRESHOLD, MappingMemory, MatchThresholds,
    ResetFilter,
};
use gps_ingest::{build_column_hints, parse_report};
use gps_map::{ReportProfile, Suggestion, SuggestionEngine, load_profile_file};
use gps_model::{
    CanonicalOutput, ClubId, Dimension, GpsSystem, MatchScope, MetricCategory, PlayerMapping,
    TeamId,
};
use gps_standards::{MetricRegistry, UnitTable};

use crate::cli::{CanonicalizeArgs, ConvertArgs, MetricsArgs, ResetArgs, SuggestArgs};
use crate::inputs::{
    load_memory, load_registry, load_roster, read_report, save_memory, write_text,
};
use crate::logging::redact_value;
use crate::summary::{apply_table_style, header_cell};

/// What `canonicalize` produced.
#[derive(Debug)]
pub struct CanonicalizeResult {
    pub output: CanonicalOutput,
    pub output_path: PathBuf,
    /// Mappings written back to memory with `--save-memory`.
    pub remembered: usize,
}

#[derive(Debug)]
pub struct SuggestResult {
    pub profile: ReportProfile,
    pub suggestions: BTreeMap<String, Suggestion>,
    pub unmapped_columns: Vec<String>,
    pub output_path: Option<PathBuf>,
}

pub fn run_canonicalize(args: &CanonicalizeArgs) -> Result<CanonicalizeResult> {
    let span = info_span!("canonicalize_file", file = %args.file.display());
    let _guard = span.enter();

    let units = UnitTable::standard();
    let registry = load_registry(args.registry.as_deref(), &units)?;
    let profile = load_profile_file(&args.profile)?;
    let roster = load_roster(&args.roster)?;
    let mut memory = load_memory(args.memory.as_deref())?;
    let scope = MatchScope {
        club_id: ClubId::new(args.club.as_str()).context("invalid --club")?,
        team_id: TeamId::new(args.team.as_str()).context("invalid --team")?,
        gps_system: profile.gps_system.clone(),
    };
    let (bytes, format) = read_report(&args.file, args.format)?;

    let options = pipeline_options(args)?;
    let canonicalizer = Canonicalizer::with_options(&registry, &units, options);
    let output = canonicalizer.run(&ReportInput {
        bytes: &bytes,
        format,
        profile: &profile,
        roster: &roster,
        memory: &memory,
        scope: &scope,
    })?;

    for review in &output.pending_reviews {
        debug!(
            raw_name = redact_value(&review.raw_name),
            candidates = review.candidates.len(),
            "player match needs review"
        );
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| args.file.with_extension("canonical.json"));
    let stored = store_canonical(output.clone(), &bytes, &registry);
    let json = stored
        .to_json_pretty()
        .context("failed to serialize canonical report")?;
    write_text(&output_path, &json)?;
    info!(path = %output_path.display(), "canonical report written");

    let mut remembered = 0;
    if args.save_memory
        && let Some(path) = args.memory.as_deref()
    {
        remembered = remember_matches(&mut memory, &output.new_player_mapping_suggestions);
        save_memory(path, &memory)?;
        info!(path = %path.display(), remembered, "player memory saved");
    }

    Ok(CanonicalizeResult {
        output,
        output_path,
        remembered,
    })
}

fn pipeline_options(args: &CanonicalizeArgs) -> Result<PipelineOptions> {
    let thresholds = MatchThresholds::new(
        args.confident_threshold
            .unwrap_or(DEFAULT_CONFIDENT_THRESHOLD),
        args.review_threshold.unwrap_or(DEFAULT_REVIEW_THRESHOLD),
    )?;
    let defaults = PipelineOptions::default();
    Ok(PipelineOptions {
        max_rows: args.max_rows.or(defaults.max_rows),
        duplicate_headers: if args.reject_duplicate_headers {
            DuplicateHeaderPolicy::Reject
        } else {
            DuplicateHeaderPolicy::FirstWins
        },
        derived: if args.all_derived {
            DerivedPolicy::All
        } else {
            DerivedPolicy::Mapped
        },
        thresholds,
    })
}

fn remember_matches(memory: &mut MappingMemory, mappings: &[PlayerMapping]) -> usize {
    for mapping in mappings {
        debug!(
            raw_name = redact_value(&mapping.raw_name),
            player = %mapping.player_id,
            "remembering player match"
        );
        memory.confirm(mapping.clone());
    }
    mappings.len()
}

pub fn run_suggest(args: &SuggestArgs) -> Result<SuggestResult> {
    let units = UnitTable::standard();
    let registry = load_registry(args.registry.as_deref(), &units)?;
    let (bytes, format) = read_report(&args.file, args.format)?;
    let parsed = parse_report(&bytes, format)?;
    let hints = build_column_hints(&parsed);

    let engine = SuggestionEngine::new(&registry, &units);
    let result = engine.suggest_profile(&parsed.headers, &hints);
    let suggestions = result.suggestions.clone();
    let unmapped_columns = result.unmapped_columns.clone();

    let id = args.id.clone().unwrap_or_else(|| file_stem(&args.file));
    let gps_system = GpsSystem::new(args.gps_system.as_str()).context("invalid --gps-system")?;
    let profile = ReportProfile::from_suggestions(id, gps_system, result)?;
    info!(
        headers = parsed.headers.len(),
        mapped = suggestions.len(),
        unmapped = unmapped_columns.len(),
        "profile drafted"
    );

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&profile).context("failed to serialize profile")?;
        write_text(path, &json)?;
    }

    Ok(SuggestResult {
        profile,
        suggestions,
        unmapped_columns,
        output_path: args.output.clone(),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("profile")
        .to_string()
}

pub fn run_metrics(args: &MetricsArgs) -> Result<()> {
    let units = UnitTable::standard();
    let registry = load_registry(args.registry.as_deref(), &units)?;
    let category = args
        .category
        .as_deref()
        .map(str::parse::<MetricCategory>)
        .transpose()?;
    println!("Registry version {}", registry.version());
    println!("{}", metrics_table(&registry, &units, category));
    Ok(())
}

/// Active metrics grouped by category, one table row per metric.
pub fn metrics_table(
    registry: &MetricRegistry,
    units: &UnitTable,
    category: Option<MetricCategory>,
) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Code"),
        header_cell("Name"),
        header_cell("Unit"),
        header_cell("Display"),
        header_cell("Formula"),
    ]);
    apply_table_style(&mut table);
    for (group, metrics) in registry.all_active() {
        if category.is_some_and(|wanted| wanted != group) {
            continue;
        }
        for metric in metrics {
            table.add_row(vec![
                group.label().to_string(),
                metric.code.to_string(),
                metric.name.clone(),
                metric.canonical_unit.clone(),
                units.suggest_default_display_unit(metric).to_string(),
                metric.formula.clone().unwrap_or_default(),
            ]);
        }
    }
    table
}

/// Converts a value and renders it with the target unit.
pub fn run_convert(args: &ConvertArgs) -> Result<String> {
    let units = UnitTable::standard();
    let dimension: Dimension = args.dimension.parse()?;
    let value = units.parse_value(&args.value, &args.from, dimension)?;
    let converted = units.convert(value, &args.from, &args.to, dimension)?;
    let unit = units
        .resolve(dimension, &args.to)
        .map_or(args.to.as_str(), |def| def.code);
    Ok(format!("{} {unit}", format_number(converted)))
}

/// Six decimals at most, trailing zeros dropped.
fn format_number(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn run_reset(args: &ResetArgs) -> Result<Vec<PlayerMapping>> {
    let mut memory = load_memory(Some(&args.memory))?;
    let mut filter = ResetFilter::new(
        ClubId::new(args.club.as_str()).context("invalid --club")?,
        TeamId::new(args.team.as_str()).context("invalid --team")?,
    );
    if let Some(system) = &args.gps_system {
        filter =
            filter.with_gps_system(GpsSystem::new(system.as_str()).context("invalid --gps-system")?);
    }
    if let Some(needle) = &args.name_contains {
        filter = filter.with_name_contains(needle.as_str());
    }
    let removed = memory.reset(&filter);
    save_memory(&args.memory, &memory)?;
    Ok(removed)
}
