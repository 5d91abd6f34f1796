#![deny(unsafe_code)]

//! Ingestion of vendor GPS exports.
//!
//! # Features
//!
//! - **Formats**: comma/semicolon/tab separated text and spreadsheets
//!   (xlsx, xlsm, xlsb, xls, ods).
//! - **Header detection**: leading title lines are skipped; blank header cells
//!   get a positional `Column N` placeholder.
//! - **Row filtering**: blank or placeholder-only rows and vendor summary rows ("Average",
//!   "Total", "Итого", ...) never reach the caller.
//!
//! Parsing is a pure function of the byte buffer; no file I/O happens here.
//!
//! ```ignore
//! use gps_ingest::{SourceFormat, parse_report};
//!
//! let report = parse_report(bytes, SourceFormat::Csv)?;
//! println!("{} columns, {} rows", report.headers.len(), report.rows.len());
//! ```

pub mod csv_table;
pub mod error;
pub mod format;
pub mod hints;
pub mod placeholder;
pub mod report;
pub mod spreadsheet;
pub mod summary;

// === Errors ===
pub use error::{IngestError, Result};

// === Parsing ===
pub use format::SourceFormat;
pub use report::{MAX_REPORT_BYTES, ParsedReport, parse_report};

// === Column metadata ===
pub use hints::build_column_hints;
pub use placeholder::is_placeholder;
pub use summary::is_summary_label;
