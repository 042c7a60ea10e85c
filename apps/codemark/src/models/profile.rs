//! Scan profile schema: what to search for, what to drop, how to group.
//!
//! Key components:
//! - `patterns` / `schemas`: what the matcher looks for. Literal patterns are
//!   escaped unless `regex = true`; `schemas` generates a `schema.table`
//!   capture pattern.
//! - `exclude`: noise filters applied before grouping.
//! - `modules`: ordered path-substring rules, first match wins.
//! - `grouping`: `module` buckets or a `schema` -> `table` index.

use serde::{Deserialize, Serialize};

/// Reserved bucket for files no module rule claims.
pub const UNKNOWN_MODULE: &str = "unknown";

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    Module,
    Schema,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// How many context lines the report shows per file.
pub enum Detail {
    #[default]
    First,
    All,
}

impl Detail {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first" => Some(Detail::First),
            "all" => Some(Detail::All),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Path-substring classification rule.
pub struct ModuleRule {
    #[serde(rename = "match")]
    pub matches: String,
    pub name: String,
}

impl ModuleRule {
    pub fn new(matches: &str, name: &str) -> Self {
        Self {
            matches: matches.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
/// Noise filters; a match satisfying any entry is dropped.
pub struct ExcludeSpec {
    #[serde(default)]
    pub path_contains: Vec<String>,
    #[serde(default)]
    pub path_glob: Vec<String>,
    #[serde(default)]
    pub context_contains: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Fully-resolved scan, built from built-ins and `[scans.<name>]` overrides.
pub struct ScanProfile {
    pub name: String,
    pub title: String,
    pub out: String,
    pub format: ReportFormat,
    pub grouping: Grouping,
    pub patterns: Vec<String>,
    pub regex: bool,
    pub schemas: Vec<String>,
    pub exclude: ExcludeSpec,
    pub modules: Vec<ModuleRule>,
    pub detail: Detail,
    pub case_insensitive: bool,
    pub extensions: Vec<String>,
}

pub fn default_module_rules() -> Vec<ModuleRule> {
    vec![
        ModuleRule::new("auth", "auth"),
        ModuleRule::new("assessment", "assessment"),
        ModuleRule::new("dashboard", "dashboard"),
        ModuleRule::new("report", "reports"),
        ModuleRule::new("settings", "settings"),
        ModuleRule::new("admin", "admin"),
        ModuleRule::new("components", "shared-components"),
    ]
}

pub fn default_exclude_dirs() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "dist",
        "build",
        "target",
        "vendor",
        "coverage",
        ".next",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx"].iter().map(|s| s.to_string()).collect()
}

pub fn default_schemas() -> Vec<String> {
    ["public", "auth", "assessment", "analytics", "storage"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The mock-data scan: literal mock indicators grouped by module.
pub fn mock_data_profile() -> ScanProfile {
    ScanProfile {
        name: "mock-data".into(),
        title: "Mock Data Usage Report".into(),
        out: "reports/mock-data-report.md".into(),
        format: ReportFormat::Markdown,
        grouping: Grouping::Module,
        patterns: ["mockData", "mock", "MOCK_", "fakeData", "dummyData", "sampleData"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        regex: false,
        schemas: Vec::new(),
        exclude: ExcludeSpec {
            path_contains: ["__tests__", "__mocks__", ".test.", ".spec.", "/test/", "/tests/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            path_glob: Vec::new(),
            context_contains: vec!["dataService".to_string()],
        },
        modules: default_module_rules(),
        detail: Detail::First,
        case_insensitive: false,
        extensions: default_extensions(),
    }
}

/// The schema-access scan: `schema.table` references grouped by schema.
pub fn schema_access_profile() -> ScanProfile {
    ScanProfile {
        name: "schema-access".into(),
        title: "Direct Schema Access Report".into(),
        out: "reports/schema-access-report.md".into(),
        format: ReportFormat::Markdown,
        grouping: Grouping::Schema,
        patterns: Vec::new(),
        regex: false,
        schemas: default_schemas(),
        exclude: ExcludeSpec {
            path_contains: ["__tests__", ".test.", ".spec.", "/migrations/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            path_glob: Vec::new(),
            context_contains: Vec::new(),
        },
        modules: default_module_rules(),
        detail: Detail::All,
        case_insensitive: false,
        extensions: default_extensions(),
    }
}

pub fn builtin_profiles() -> Vec<ScanProfile> {
    vec![mock_data_profile(), schema_access_profile()]
}
