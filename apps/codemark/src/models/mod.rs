//! Shared data models for matches, groupings, and rendered reports.

pub mod profile;

use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A schema-qualified table reference captured from a line.
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One line (or captured span) that matched one pattern.
pub struct RawMatch {
    pub file: String,
    pub line: usize,
    pub context: String,
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// All unique contexts found in one file, in first-seen order.
pub struct FileMatchGroup {
    pub file: String,
    pub contexts: Vec<String>,
}

impl FileMatchGroup {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            contexts: Vec::new(),
        }
    }

    /// Record a context unless an identical one is already stored.
    pub fn add_context(&mut self, context: &str) -> bool {
        if self.contexts.iter().any(|c| c == context) {
            return false;
        }
        self.contexts.push(context.to_string());
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Files assigned to one logical module.
pub struct ModuleBucket {
    pub module: String,
    pub groups: Vec<FileMatchGroup>,
}

/// schema -> table -> files referencing `schema.table`, files in first-seen order.
pub type SchemaTableIndex = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Rendered report: title plus ordered sections.
pub struct Report {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n", self.title);
        for s in &self.sections {
            out.push('\n');
            out.push_str(&format!("## {}\n\n", s.heading));
            out.push_str(s.body.trim_end());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Per-scan numbers shown on the console.
pub struct ScanSummary {
    pub scan: String,
    pub report: String,
    pub files: usize,
    pub findings: usize,
    pub skipped: usize,
}
