//! Error type shared by the scan pipeline, configuration, and label sync.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("scan root does not exist: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob '{glob}': {source}")]
    Glob {
        glob: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot write report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scan '{scan}': {message}")]
    InvalidScan { scan: String, message: String },

    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown scan '{0}'")]
    UnknownScan(String),

    #[error("label '{name}': {message}")]
    Label { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal traversal problem: the path is skipped and the scan continues.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanWarning {
    pub path: String,
    pub message: String,
}
