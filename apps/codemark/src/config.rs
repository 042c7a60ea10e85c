//! Configuration discovery and effective settings resolution.
//!
//! Codemark reads `codemark.toml|yaml|yml` from the repository root (or the
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `root`: `.`
//! - `output`: `human`
//! - `exclude_dirs`: dependency/vendor/build directories
//! - `extensions`: `ts, tsx, js, jsx`
//! - `case_insensitive`: false
//! - scans: built-in `mock-data` and `schema-access`
//!
//! Overrides precedence: CLI > `[scans.<name>]` > top-level keys > built-ins.

use crate::error::{Error, Result};
use crate::labels::{default_labels, Label};
use crate::matcher::compile_patterns;
use crate::models::profile::{
    builtin_profiles, default_exclude_dirs, default_extensions, default_module_rules, Detail,
    ExcludeSpec, Grouping, ModuleRule, ReportFormat, ScanProfile,
};
use crate::render::title_case;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["codemark.toml", "codemark.yaml", "codemark.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Per-scan section under `[scans.<name>]`.
pub struct ScanCfg {
    pub title: Option<String>,
    pub out: Option<String>,
    pub format: Option<ReportFormat>,
    pub grouping: Option<Grouping>,
    pub patterns: Option<Vec<String>>,
    pub regex: Option<bool>,
    pub schemas: Option<Vec<String>>,
    pub exclude: Option<ExcludeSpec>,
    pub modules: Option<Vec<ModuleRule>>,
    pub detail: Option<Detail>,
    pub case_insensitive: Option<bool>,
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Label sync section under `[labels]`.
pub struct LabelsCfg {
    pub repo: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<Label>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `codemark.toml|yaml`.
pub struct CodemarkConfig {
    pub root: Option<String>,
    pub output: Option<String>,
    pub detail: Option<Detail>,
    pub case_insensitive: Option<bool>,
    pub exclude_dirs: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub modules: Option<Vec<ModuleRule>>,
    #[serde(default)]
    pub scans: Option<BTreeMap<String, ScanCfg>>,
    #[serde(default)]
    pub labels: Option<LabelsCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub root: PathBuf,
    pub root_label: String,
    pub output: String,
    pub exclude_dirs: Vec<String>,
    pub scans: Vec<ScanProfile>,
    pub labels: Vec<Label>,
    pub label_repo: Option<String>,
}

impl Effective {
    pub fn scan(&self, name: &str) -> Result<&ScanProfile> {
        self.scans
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::UnknownScan(name.to_string()))
    }

    /// Report destination for a profile, relative to the repo root.
    pub fn report_path(&self, profile: &ScanProfile) -> PathBuf {
        self.repo_root.join(&profile.out)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `codemark.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) if !p.as_os_str().is_empty() => cur = p,
            _ => return start.to_path_buf(),
        }
    }
}

/// Load `CodemarkConfig` from the first config file present under `root`.
///
/// Returns `Ok(None)` when no file exists; a file that does not parse is an
/// error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, CodemarkConfig)>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<CodemarkConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<CodemarkConfig>(&s).map_err(|e| e.to_string())
        };
        return match parsed {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(Error::Config { path, message }),
        };
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_root: Option<&str>,
    cli_output: Option<&str>,
    cli_detail: Option<Detail>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config_path, cfg) = match load_config(&repo_root)? {
        Some((p, c)) => (Some(p), c),
        None => (None, CodemarkConfig::default()),
    };
    let cfg_file = config_path
        .clone()
        .unwrap_or_else(|| repo_root.join(CONFIG_FILES[0]));

    let root_label = cli_root
        .map(|s| s.to_string())
        .or(cfg.root.clone())
        .unwrap_or_else(|| ".".to_string());
    let root = repo_root.join(&root_label);

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output.clone())
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(Error::Config {
            path: cfg_file,
            message: format!("output must be human|json, got '{}'", output),
        });
    }

    let exclude_dirs = cfg.exclude_dirs.clone().unwrap_or_else(default_exclude_dirs);

    let mut scans: Vec<ScanProfile> = builtin_profiles()
        .into_iter()
        .map(|p| apply_top_level(p, &cfg))
        .collect();
    for (name, sc) in cfg.scans.clone().unwrap_or_default() {
        match scans.iter().position(|p| p.name == name) {
            Some(i) => {
                let merged = apply_scan_cfg(scans[i].clone(), &sc);
                scans[i] = merged;
            }
            None => {
                let base = apply_top_level(blank_profile(&name), &cfg);
                scans.push(apply_scan_cfg(base, &sc));
            }
        }
    }
    for s in &scans {
        compile_patterns(s).map_err(|e| Error::Config {
            path: cfg_file.clone(),
            message: e.to_string(),
        })?;
    }
    if let Some(d) = cli_detail {
        for s in scans.iter_mut() {
            s.detail = d;
        }
    }

    let labels_cfg = cfg.labels.clone().unwrap_or_default();
    let module_rules = cfg.modules.clone().unwrap_or_else(default_module_rules);
    let labels = labels_cfg
        .items
        .clone()
        .unwrap_or_else(|| default_labels(&module_rules));

    Ok(Effective {
        repo_root,
        config_path,
        root,
        root_label,
        output,
        exclude_dirs,
        scans,
        labels,
        label_repo: labels_cfg.repo,
    })
}

/// Starting point for a scan that exists only in config.
fn blank_profile(name: &str) -> ScanProfile {
    ScanProfile {
        name: name.to_string(),
        title: format!("{} Report", title_case(name)),
        out: format!("reports/{}-report.md", name),
        format: ReportFormat::Markdown,
        grouping: Grouping::Module,
        patterns: Vec::new(),
        regex: false,
        schemas: Vec::new(),
        exclude: ExcludeSpec::default(),
        modules: default_module_rules(),
        detail: Detail::First,
        case_insensitive: false,
        extensions: default_extensions(),
    }
}

fn apply_top_level(mut p: ScanProfile, cfg: &CodemarkConfig) -> ScanProfile {
    if let Some(d) = cfg.detail {
        p.detail = d;
    }
    if let Some(ci) = cfg.case_insensitive {
        p.case_insensitive = ci;
    }
    if let Some(ext) = cfg.extensions.as_ref() {
        p.extensions = ext.clone();
    }
    if let Some(m) = cfg.modules.as_ref() {
        p.modules = m.clone();
    }
    p
}

fn apply_scan_cfg(mut p: ScanProfile, c: &ScanCfg) -> ScanProfile {
    if let Some(v) = c.title.as_ref() {
        p.title = v.clone();
    }
    if let Some(v) = c.out.as_ref() {
        p.out = v.clone();
    }
    if let Some(v) = c.format {
        p.format = v;
    }
    if let Some(v) = c.grouping {
        p.grouping = v;
    }
    if let Some(v) = c.patterns.as_ref() {
        p.patterns = v.clone();
    }
    if let Some(v) = c.regex {
        p.regex = v;
    }
    if let Some(v) = c.schemas.as_ref() {
        p.schemas = v.clone();
    }
    if let Some(v) = c.exclude.as_ref() {
        p.exclude = v.clone();
    }
    if let Some(v) = c.modules.as_ref() {
        p.modules = v.clone();
    }
    if let Some(v) = c.detail {
        p.detail = v;
    }
    if let Some(v) = c.case_insensitive {
        p.case_insensitive = v;
    }
    if let Some(v) = c.extensions.as_ref() {
        p.extensions = v.clone();
    }
    p
}
