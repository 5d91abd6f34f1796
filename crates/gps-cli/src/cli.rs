//! Argument definitions for `gps-canon`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use crate::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "gps-canon",
    version,
    about = "Canonicalize vendor GPS tracking reports",
    long_about = "Turn heterogeneous vendor GPS exports (CSV, XLSX, XLS) into canonical\n\
                  per-player rows keyed by metric code and stored in canonical units."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow athlete names in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Canonicalize one report against a saved profile.
    Canonicalize(CanonicalizeArgs),

    /// Draft a profile from a sample report.
    Suggest(SuggestArgs),

    /// List the active canonical metrics.
    Metrics(MetricsArgs),

    /// Convert a value between units of one dimension.
    Convert(ConvertArgs),

    /// Delete remembered player mappings for a club and team.
    ResetMappings(ResetArgs),
}

#[derive(Args)]
pub struct CanonicalizeArgs {
    /// Report file (CSV, XLSX or XLS).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Profile JSON describing the report's columns.
    #[arg(long, value_name = "PATH")]
    pub profile: PathBuf,

    /// Team roster, JSON array or CSV with id,first_name,last_name.
    #[arg(long, value_name = "PATH")]
    pub roster: PathBuf,

    /// Player mapping memory JSON. A missing file starts empty.
    #[arg(long, value_name = "PATH")]
    pub memory: Option<PathBuf>,

    #[arg(long = "club", value_name = "ID")]
    pub club: String,

    #[arg(long = "team", value_name = "ID")]
    pub team: String,

    /// Override the format inferred from the file extension.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Where to write the stored report JSON (default: <FILE>.canonical.json).
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Metric registry TOML to use instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Refuse reports with more data rows than this.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,

    /// Score at or above which a fuzzy match is accepted.
    #[arg(long = "confident-threshold", value_name = "SCORE")]
    pub confident_threshold: Option<f64>,

    /// Score at or above which a fuzzy match is offered for review.
    #[arg(long = "review-threshold", value_name = "SCORE")]
    pub review_threshold: Option<f64>,

    /// Stop on repeated headers instead of using the first one.
    #[arg(long = "reject-duplicate-headers")]
    pub reject_duplicate_headers: bool,

    /// Evaluate every derived metric, even ones whose inputs are not mapped.
    #[arg(long = "all-derived")]
    pub all_derived: bool,

    /// Write auto-confirmed player matches back to the memory file.
    #[arg(long = "save-memory", requires = "memory")]
    pub save_memory: bool,
}

#[derive(Args)]
pub struct SuggestArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Vendor system the report comes from.
    #[arg(long = "gps-system", value_name = "NAME")]
    pub gps_system: String,

    /// Profile id (default: the file stem).
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Where to write the drafted profile JSON.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

#[derive(Args)]
pub struct MetricsArgs {
    /// Only list one category (e.g. distance, speed_zones).
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Value to convert. Time values also accept clock text such as 90:30.
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    #[arg(long, value_name = "UNIT")]
    pub from: String,

    #[arg(long, value_name = "UNIT")]
    pub to: String,

    /// Dimension both units belong to (distance, speed, time, ...).
    #[arg(long, value_name = "DIMENSION")]
    pub dimension: String,
}

#[derive(Args)]
pub struct ResetArgs {
    #[arg(long, value_name = "PATH")]
    pub memory: PathBuf,

    #[arg(long = "club", value_name = "ID")]
    pub club: String,

    #[arg(long = "team", value_name = "ID")]
    pub team: String,

    /// Only reset mappings for this vendor system.
    #[arg(long = "gps-system", value_name = "NAME")]
    pub gps_system: Option<String>,

    /// Only reset mappings whose raw name contains this text.
    #[arg(long = "name-contains", value_name = "TEXT")]
    pub name_contains: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Spreadsheet,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
