//! Pattern matcher: walks a source tree and reports matching lines.
//!
//! The walk is sorted by file name so that output order is stable for a
//! fixed filesystem state. Excluded directory names are pruned wherever
//! they appear below the root. Files are read in parallel and collected
//! back in walk order.
//!
//! Unreadable entries never abort the scan: they become `ScanWarning`s and
//! the affected subtree or file is skipped. Only a missing root is fatal.

use crate::error::{Error, Result, ScanWarning};
use crate::models::profile::{Grouping, ScanProfile};
use crate::models::{RawMatch, TableRef};
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A compiled search pattern.
///
/// Patterns whose regex carries both a `schema` and a `table` named group
/// report the captured `schema.table` span instead of the whole line.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub source: String,
    regex: Regex,
    captures_table: bool,
}

impl CompiledPattern {
    /// Plain substring, escaped before compiling.
    pub fn literal(text: &str, case_insensitive: bool) -> Result<Self> {
        Self::build(text, &regex::escape(text), case_insensitive)
    }

    pub fn regex(expr: &str, case_insensitive: bool) -> Result<Self> {
        Self::build(expr, expr, case_insensitive)
    }

    /// `schema.table` references for the given schema names.
    pub fn schema_tables(schemas: &[String], case_insensitive: bool) -> Result<Self> {
        let alts: Vec<String> = schemas.iter().map(|s| regex::escape(s)).collect();
        let expr = format!(
            r"\b(?P<schema>{})\.(?P<table>[A-Za-z_][A-Za-z0-9_]*)\b",
            alts.join("|")
        );
        Self::build(&expr, &expr, case_insensitive)
    }

    fn build(source: &str, expr: &str, case_insensitive: bool) -> Result<Self> {
        let regex = RegexBuilder::new(expr)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| Error::Pattern {
                pattern: source.to_string(),
                source: e,
            })?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        let captures_table = names.contains(&"schema") && names.contains(&"table");
        Ok(Self {
            source: source.to_string(),
            regex,
            captures_table,
        })
    }

    pub fn captures_table(&self) -> bool {
        self.captures_table
    }

    /// Contexts produced by one line: the full line, indentation included,
    /// for plain patterns; one entry per captured span for table patterns.
    pub fn match_line(&self, line: &str) -> Vec<(String, Option<TableRef>)> {
        if !self.captures_table {
            if self.regex.is_match(line) {
                return vec![(line.to_string(), None)];
            }
            return Vec::new();
        }
        self.regex
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let schema = caps.name("schema")?.as_str().to_string();
                let table = caps.name("table")?.as_str().to_string();
                Some((whole.as_str().to_string(), Some(TableRef { schema, table })))
            })
            .collect()
    }
}

/// Compile the pattern set of a profile in configuration order.
///
/// A profile with nothing to search for is rejected. Schema grouping only
/// reports `schema.table` captures, so every pattern of a schema-grouped
/// profile must carry `schema` and `table` groups.
pub fn compile_patterns(profile: &ScanProfile) -> Result<Vec<CompiledPattern>> {
    let invalid = |message: String| Error::InvalidScan {
        scan: profile.name.clone(),
        message,
    };
    let mut out = Vec::new();
    if !profile.schemas.is_empty() {
        out.push(CompiledPattern::schema_tables(
            &profile.schemas,
            profile.case_insensitive,
        )?);
    }
    for p in &profile.patterns {
        let compiled = if profile.regex {
            CompiledPattern::regex(p, profile.case_insensitive)?
        } else {
            CompiledPattern::literal(p, profile.case_insensitive)?
        };
        out.push(compiled);
    }
    if out.is_empty() {
        return Err(invalid("needs `patterns` or `schemas`".to_string()));
    }
    if profile.grouping == Grouping::Schema {
        if let Some(p) = out.iter().find(|p| !p.captures_table()) {
            return Err(invalid(format!(
                "schema grouping needs `schema`/`table` groups, pattern '{}' has none",
                p.source
            )));
        }
    }
    Ok(out)
}

#[derive(Debug, Default)]
pub struct SearchOutput {
    pub matches: Vec<RawMatch>,
    pub warnings: Vec<ScanWarning>,
}

/// Search seam used by the pipeline; `FsSearcher` reads the real tree.
pub trait LineSearcher {
    fn search(
        &self,
        root: &Path,
        pattern: &CompiledPattern,
        extensions: &[String],
    ) -> Result<SearchOutput>;
}

/// Filesystem-backed searcher.
pub struct FsSearcher {
    exclude_dirs: Vec<String>,
    display_base: PathBuf,
}

impl FsSearcher {
    /// `display_base` is the directory reported paths are made relative to.
    pub fn new(exclude_dirs: Vec<String>, display_base: impl Into<PathBuf>) -> Self {
        Self {
            exclude_dirs,
            display_base: display_base.into(),
        }
    }

    fn collect_files(
        &self,
        root: &Path,
        extensions: &[String],
        warnings: &mut Vec<ScanWarning>,
    ) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !(e.file_type().is_dir()
                        && self
                            .exclude_dirs
                            .iter()
                            .any(|d| e.file_name().to_string_lossy() == d.as_str()))
            });
        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(e) => {
                    if e.file_type().is_file() && has_extension(e.path(), extensions) {
                        files.push(e.into_path());
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| display_path(p, &self.display_base))
                        .unwrap_or_else(|| display_path(root, &self.display_base));
                    warn!(path = %path, "skipping unreadable path: {}", err);
                    warnings.push(ScanWarning {
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }
        files
    }
}

impl LineSearcher for FsSearcher {
    fn search(
        &self,
        root: &Path,
        pattern: &CompiledPattern,
        extensions: &[String],
    ) -> Result<SearchOutput> {
        if !root.exists() {
            return Err(Error::MissingRoot(root.to_path_buf()));
        }
        let mut warnings = Vec::new();
        let files = self.collect_files(root, extensions, &mut warnings);
        debug!(
            pattern = %pattern.source,
            files = files.len(),
            "searching"
        );

        let per_file: Vec<std::result::Result<Vec<RawMatch>, ScanWarning>> = files
            .par_iter()
            .map(|path| {
                let shown = display_path(path, &self.display_base);
                let data = fs::read_to_string(path).map_err(|e| ScanWarning {
                    path: shown.clone(),
                    message: e.to_string(),
                })?;
                Ok(match_text(&shown, &data, pattern))
            })
            .collect();

        let mut matches = Vec::new();
        for r in per_file {
            match r {
                Ok(mut found) => matches.append(&mut found),
                Err(w) => {
                    warn!(path = %w.path, "skipping unreadable file: {}", w.message);
                    warnings.push(w);
                }
            }
        }
        Ok(SearchOutput { matches, warnings })
    }
}

/// Match every line of `text`, attributing results to `file`.
pub fn match_text(file: &str, text: &str, pattern: &CompiledPattern) -> Vec<RawMatch> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for (context, table) in pattern.match_line(line) {
            out.push(RawMatch {
                file: file.to_string(),
                line: idx + 1,
                context,
                pattern: pattern.source.clone(),
                table,
            });
        }
    }
    out
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            extensions
                .iter()
                .any(|e| e.trim_start_matches('.') == &*ext)
        }
        None => false,
    }
}

/// Path shown in reports: relative to `base` when possible, `/`-separated.
pub fn display_path(path: &Path, base: &Path) -> String {
    let rel = match path.strip_prefix(base) {
        Ok(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf()),
    };
    let s = rel.to_string_lossy().replace('\\', "/");
    match s.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => s,
    }
}
