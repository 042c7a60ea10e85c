//! Folds raw matches into one group per file.
//!
//! Exclusions run first; anything they reject never reaches a group. File
//! order and context order both follow first appearance in the input.

use crate::error::{Error, Result};
use crate::models::profile::ExcludeSpec;
use crate::models::{FileMatchGroup, RawMatch, SchemaTableIndex};
use glob::Pattern;
use std::collections::HashMap;

/// Predicate over `(file, context)`; `true` drops the match.
pub trait Exclusion {
    fn excludes(&self, file: &str, context: &str) -> bool;
}

impl<F> Exclusion for F
where
    F: Fn(&str, &str) -> bool,
{
    fn excludes(&self, file: &str, context: &str) -> bool {
        self(file, context)
    }
}

#[derive(Debug, Clone)]
pub enum ExcludeRule {
    PathContains(String),
    PathGlob(Pattern),
    ContextContains(String),
}

impl Exclusion for ExcludeRule {
    fn excludes(&self, file: &str, context: &str) -> bool {
        match self {
            ExcludeRule::PathContains(s) => file.contains(s.as_str()),
            ExcludeRule::PathGlob(p) => p.matches(file),
            ExcludeRule::ContextContains(s) => context.contains(s.as_str()),
        }
    }
}

/// Turn the configured exclude section into rules.
pub fn build_exclusions(spec: &ExcludeSpec) -> Result<Vec<ExcludeRule>> {
    let mut rules: Vec<ExcludeRule> = spec
        .path_contains
        .iter()
        .map(|s| ExcludeRule::PathContains(s.clone()))
        .collect();
    for g in &spec.path_glob {
        let p = Pattern::new(g).map_err(|e| Error::Glob {
            glob: g.clone(),
            source: e,
        })?;
        rules.push(ExcludeRule::PathGlob(p));
    }
    rules.extend(
        spec.context_contains
            .iter()
            .map(|s| ExcludeRule::ContextContains(s.clone())),
    );
    Ok(rules)
}

fn is_excluded<E: Exclusion>(m: &RawMatch, exclusions: &[E]) -> bool {
    exclusions.iter().any(|e| e.excludes(&m.file, &m.context))
}

/// Group surviving matches by file, deduplicating contexts by exact text.
pub fn aggregate<E: Exclusion>(matches: &[RawMatch], exclusions: &[E]) -> Vec<FileMatchGroup> {
    let mut groups: Vec<FileMatchGroup> = Vec::new();
    let mut by_file: HashMap<&str, usize> = HashMap::new();
    for m in matches {
        if is_excluded(m, exclusions) {
            continue;
        }
        let idx = *by_file.entry(m.file.as_str()).or_insert_with(|| {
            groups.push(FileMatchGroup::new(m.file.as_str()));
            groups.len() - 1
        });
        groups[idx].add_context(&m.context);
    }
    groups
}

/// Build the schema -> table -> files index from table-capturing matches.
pub fn index_tables<E: Exclusion>(matches: &[RawMatch], exclusions: &[E]) -> SchemaTableIndex {
    let mut index = SchemaTableIndex::new();
    for m in matches {
        let Some(t) = m.table.as_ref() else {
            continue;
        };
        if is_excluded(m, exclusions) {
            continue;
        }
        let files = index
            .entry(t.schema.clone())
            .or_default()
            .entry(t.table.clone())
            .or_default();
        if !files.iter().any(|f| f == &m.file) {
            files.push(m.file.clone());
        }
    }
    index
}
