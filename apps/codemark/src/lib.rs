//! Codemark core library.
//!
//! This crate exposes programmatic APIs for scanning a source tree for
//! textual patterns, grouping the hits per file, bucketing files into
//! modules (or indexing `schema.table` references), and rendering the result
//! as a report.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `matcher`: Tree walk and per-line pattern matching.
//! - `aggregate`: Exclusion filtering and per-file grouping.
//! - `classify`: Path-substring module classification.
//! - `render`: Report sections for module and schema scans.
//! - `pipeline`: Runs one scan end to end and writes reports.
//! - `labels`: Issue-tracker label synchronization.
//! - `models`: Data models for matches, groups, profiles, and reports.
//! - `output`: Human/JSON console printers.
//! - `utils`: Supporting helpers.
pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod labels;
pub mod matcher;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod utils;

pub use error::{Error, Result, ScanWarning};
