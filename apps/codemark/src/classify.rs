//! Module classifier: ordered path-substring rules, first match wins.

use crate::models::profile::{ModuleRule, UNKNOWN_MODULE};
use crate::models::{FileMatchGroup, ModuleBucket};

/// Module name for a single path; `UNKNOWN_MODULE` when no rule matches.
pub fn module_for<'a>(file: &str, rules: &'a [ModuleRule]) -> &'a str {
    rules
        .iter()
        .find(|r| !r.matches.is_empty() && file.contains(r.matches.as_str()))
        .map(|r| r.name.as_str())
        .unwrap_or(UNKNOWN_MODULE)
}

/// Assign every group to exactly one bucket.
///
/// Buckets come back in first-rule order (by the position of the first rule
/// naming the module), with `unknown` last. Empty buckets are kept so callers
/// can see the full rule set; the renderer skips them.
pub fn classify(groups: Vec<FileMatchGroup>, rules: &[ModuleRule]) -> Vec<ModuleBucket> {
    let mut buckets: Vec<ModuleBucket> = Vec::new();
    for r in rules {
        if r.name != UNKNOWN_MODULE && !buckets.iter().any(|b| b.module == r.name) {
            buckets.push(ModuleBucket {
                module: r.name.clone(),
                groups: Vec::new(),
            });
        }
    }
    buckets.push(ModuleBucket {
        module: UNKNOWN_MODULE.to_string(),
        groups: Vec::new(),
    });

    for g in groups {
        let name = module_for(&g.file, rules);
        if let Some(b) = buckets.iter_mut().find(|b| b.module == name) {
            b.groups.push(g);
        }
    }
    buckets
}
