//! Reading and writing the files a command works with.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use gps_identity::MappingMemory;
use gps_ingest::SourceFormat;
use gps_model::RosterPlayer;
use gps_standards::{MetricRegistry, UnitTable};

use crate::cli::FormatArg;

/// Loads the registry from `path`, or the built-in one.
pub fn load_registry(path: Option<&Path>, units: &UnitTable) -> Result<MetricRegistry> {
    match path {
        Some(path) => MetricRegistry::load_from_path(path, units)
            .with_context(|| format!("failed to load registry: {}", path.display())),
        None => MetricRegistry::load_default(units).context("failed to load built-in registry"),
    }
}

/// Reads report bytes and settles the source format.
pub fn read_report(path: &Path, format: Option<FormatArg>) -> Result<(Vec<u8>, SourceFormat)> {
    let format = match format {
        Some(FormatArg::Csv) => SourceFormat::Csv,
        Some(FormatArg::Spreadsheet) => SourceFormat::Spreadsheet,
        None => SourceFormat::from_path(path)
            .with_context(|| format!("cannot infer report format: {}", path.display()))?,
    };
    let bytes =
        fs::read(path).with_context(|| format!("failed to read report: {}", path.display()))?;
    Ok((bytes, format))
}

/// Loads a roster from a JSON array or a CSV with `id,first_name,last_name`.
pub fn load_roster(path: &Path) -> Result<Vec<RosterPlayer>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let roster: Vec<RosterPlayer> = if is_csv {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("failed to open roster: {}", path.display()))?;
        reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("failed to parse roster: {}", path.display()))?
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read roster: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse roster: {}", path.display()))?
    };
    if roster.is_empty() {
        bail!("roster is empty: {}", path.display());
    }
    debug!(players = roster.len(), "roster loaded");
    Ok(roster)
}

/// Loads mapping memory. A file that does not exist yet gives empty memory.
pub fn load_memory(path: Option<&Path>) -> Result<MappingMemory> {
    let Some(path) = path else {
        return Ok(MappingMemory::new());
    };
    if !path.exists() {
        debug!(path = %path.display(), "memory file missing, starting empty");
        return Ok(MappingMemory::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read memory: {}", path.display()))?;
    MappingMemory::from_json(&text)
        .with_context(|| format!("failed to parse memory: {}", path.display()))
}

pub fn save_memory(path: &Path, memory: &MappingMemory) -> Result<()> {
    let json = memory
        .to_json_pretty()
        .context("failed to serialize memory")?;
    write_text(path, &json)
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
