//! Command-line front end for the GPS report canonicalization engine.
//!
//! The binary (`gps-canon`) is a thin shell over these modules so the
//! commands can be driven from tests with files in a temporary directory.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod inputs;
pub mod logging;
pub mod summary;
