#![deny(unsafe_code)]

//! Reference data for GPS report canonicalization.
//!
//! # Features
//!
//! - **Units**: the immutable [`UnitTable`] of dimensions, units and scale
//!   factors, plus value parsing and conversion.
//! - **Registry**: the [`MetricRegistry`] of canonical metrics, loaded once
//!   from TOML and validated (units, formulas, reference cycles).
//! - **Formulas**: the small arithmetic language used by derived metrics.
//!
//! Both the unit table and the registry are plain values. Build them once at
//! startup and pass them by reference to every component that needs them.
//!
//! ```ignore
//! use gps_standards::{MetricRegistry, UnitTable};
//!
//! let units = UnitTable::standard();
//! let registry = MetricRegistry::load_default(&units)?;
//! let speed = registry.lookup("max_speed").unwrap();
//! assert_eq!(units.suggest_default_display_unit(speed), "km/h");
//! ```

pub mod embedded;
pub mod error;
pub mod formula;
pub mod registry;
pub mod units;

// === Errors ===
pub use error::{StandardsError, UnitError};

// === Formulas ===
pub use formula::{EvalError, Formula, FormulaError};

// === Registry ===
pub use registry::{MetricRegistry, RegistryConfig};

// === Units ===
pub use units::{ClockLayout, UnitDef, UnitTable};
