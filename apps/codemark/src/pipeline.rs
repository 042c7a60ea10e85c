//! Scan runner: matcher -> aggregator -> classifier -> renderer.
//!
//! Produces a `ScanOutcome` holding the rendered report text and a summary.
//! Nothing is written here except by `write_reports`, which callers invoke
//! only once rendering has fully succeeded.

use crate::aggregate::{aggregate, build_exclusions, index_tables};
use crate::classify::classify;
use crate::error::{Error, Result, ScanWarning};
use crate::matcher::{compile_patterns, LineSearcher};
use crate::models::profile::{Grouping, ReportFormat, ScanProfile};
use crate::models::{RawMatch, Report, ScanSummary};
use crate::render::{render_modules, render_schemas, TitleMeta};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub struct ScanOutcome {
    pub report: Report,
    pub rendered: String,
    pub summary: ScanSummary,
    pub warnings: Vec<ScanWarning>,
}

/// Run one profile against `root`.
///
/// `root_label` is how the root appears in the report overview. Patterns
/// are searched one after another; grouping starts once all are done.
pub fn run_scan<S: LineSearcher + ?Sized>(
    searcher: &S,
    profile: &ScanProfile,
    root: &Path,
    root_label: &str,
) -> Result<ScanOutcome> {
    let patterns = compile_patterns(profile)?;
    let exclusions = build_exclusions(&profile.exclude)?;
    info!(scan = %profile.name, patterns = patterns.len(), "running scan");

    let mut matches: Vec<RawMatch> = Vec::new();
    let mut warnings: Vec<ScanWarning> = Vec::new();
    for p in &patterns {
        let mut out = searcher.search(root, p, &profile.extensions)?;
        debug!(pattern = %p.source, matches = out.matches.len(), "pattern done");
        matches.append(&mut out.matches);
        for w in out.warnings {
            if !warnings.contains(&w) {
                warnings.push(w);
            }
        }
    }

    let meta = TitleMeta {
        title: profile.title.clone(),
        root: root_label.to_string(),
        patterns: if profile.schemas.is_empty() {
            profile.patterns.clone()
        } else {
            profile
                .schemas
                .iter()
                .map(|s| format!("{}.*", s))
                .chain(profile.patterns.iter().cloned())
                .collect()
        },
    };

    let (report, files, findings) = match profile.grouping {
        Grouping::Module => {
            let groups = aggregate(&matches, &exclusions);
            let files = groups.len();
            let findings = groups.iter().map(|g| g.contexts.len()).sum();
            let buckets = classify(groups, &profile.modules);
            (render_modules(&buckets, &meta, profile.detail), files, findings)
        }
        Grouping::Schema => {
            let index = index_tables(&matches, &exclusions);
            let files = aggregate(
                &matches
                    .iter()
                    .filter(|m| m.table.is_some())
                    .cloned()
                    .collect::<Vec<_>>(),
                &exclusions,
            )
            .len();
            let findings = index
                .values()
                .flat_map(|t| t.values())
                .map(|f| f.len())
                .sum();
            (render_schemas(&index, &meta), files, findings)
        }
    };

    let rendered = match profile.format {
        ReportFormat::Markdown => report.to_markdown(),
        ReportFormat::Json => report.to_json()?,
    };
    info!(scan = %profile.name, files, findings, "scan complete");
    Ok(ScanOutcome {
        report,
        rendered,
        summary: ScanSummary {
            scan: profile.name.clone(),
            report: profile.out.clone(),
            files,
            findings,
            skipped: warnings.len(),
        },
        warnings,
    })
}

/// Persist rendered reports, creating parent directories as needed.
///
/// Each report is staged in a temporary file beside its target. Targets are
/// only replaced once every report is staged, so a failure while staging
/// leaves all existing reports untouched.
pub fn write_reports(reports: &[(PathBuf, &str)]) -> Result<()> {
    let mut staged = Vec::with_capacity(reports.len());
    for (path, text) in reports {
        let wrap = |e: std::io::Error| Error::Write {
            path: path.clone(),
            source: e,
        };
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(wrap)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
        tmp.write_all(text.as_bytes()).map_err(wrap)?;
        staged.push((path, tmp));
    }
    for (path, tmp) in staged {
        tmp.persist(path).map_err(|e| Error::Write {
            path: path.clone(),
            source: e.error,
        })?;
        debug!(path = %path.display(), "report written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{match_text, CompiledPattern, FsSearcher, SearchOutput};
    use crate::models::profile::{mock_data_profile, schema_access_profile, ModuleRule};
    use tempfile::tempdir;

    /// In-memory tree: (path, contents) pairs in walk order.
    struct MemorySearcher {
        files: Vec<(String, String)>,
    }

    impl MemorySearcher {
        fn new(files: &[(&str, &str)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(p, c)| (p.to_string(), c.to_string()))
                    .collect(),
            }
        }
    }

    impl LineSearcher for MemorySearcher {
        fn search(
            &self,
            _root: &Path,
            pattern: &CompiledPattern,
            extensions: &[String],
        ) -> Result<SearchOutput> {
            let mut out = SearchOutput::default();
            for (path, text) in &self.files {
                let ext = path.rsplit('.').next().unwrap_or("");
                if extensions.iter().any(|e| e == ext) {
                    out.matches.extend(match_text(path, text, pattern));
                }
            }
            Ok(out)
        }
    }

    fn profile(patterns: &[&str]) -> ScanProfile {
        let mut p = mock_data_profile();
        p.patterns = patterns.iter().map(|s| s.to_string()).collect();
        p.modules = vec![ModuleRule::new("assessment", "assessment")];
        p
    }

    #[test]
    fn test_assessment_scenario() {
        let s = MemorySearcher::new(&[(
            "src/assessment/loader.ts",
            "const mockData = load();\n",
        )]);
        let out = run_scan(&s, &profile(&["mock"]), Path::new("src"), "src").unwrap();
        let sec = out.report.section("Assessment Module").unwrap();
        assert!(sec.body.contains("`src/assessment/loader.ts`"));
        assert!(sec.body.contains("const mockData = load();"));
        assert_eq!(out.summary.files, 1);
        assert_eq!(out.summary.findings, 1);
    }

    #[test]
    fn test_two_patterns_same_line_single_context() {
        let s = MemorySearcher::new(&[("src/auth/a.ts", "const MOCK_mockUser = {};\n")]);
        let p = profile(&["mock", "MOCK_"]);
        let out = run_scan(&s, &p, Path::new("src"), "src").unwrap();
        assert_eq!(out.summary.findings, 1);
        assert_eq!(out.rendered.matches("const MOCK_mockUser = {};").count(), 1);
    }

    #[test]
    fn test_zero_findings_report() {
        let s = MemorySearcher::new(&[("src/a.ts", "clean\n")]);
        let out = run_scan(&s, &profile(&["mock"]), Path::new("src"), "src").unwrap();
        let headings: Vec<&str> = out
            .report
            .sections
            .iter()
            .map(|s| s.heading.as_str())
            .collect();
        assert_eq!(headings, vec!["Overview", "Next Steps"]);
        assert!(out.rendered.contains("No findings"));
        assert_eq!(out.summary.files, 0);
    }

    #[test]
    fn test_default_exclusions_drop_tests_and_migrated_lines() {
        let s = MemorySearcher::new(&[
            ("src/__tests__/a.ts", "mockData"),
            ("src/auth/b.spec.ts", "mockData"),
            ("src/auth/c.ts", "dataService.load(mockData)"),
            ("src/auth/d.ts", "const mockData = [];"),
        ]);
        let mut p = mock_data_profile();
        p.patterns = vec!["mockData".into()];
        let out = run_scan(&s, &p, Path::new("src"), "src").unwrap();
        assert_eq!(out.summary.files, 1);
        assert!(out.rendered.contains("src/auth/d.ts"));
        assert!(!out.rendered.contains("src/auth/c.ts"));
    }

    #[test]
    fn test_schema_scan_groups_by_schema_and_table() {
        let s = MemorySearcher::new(&[
            ("src/a.ts", "from('assessment.results'); auth.users"),
            ("src/b.ts", "select * from auth.users"),
            ("src/c.ts", "nothing.here"),
        ]);
        let mut p = schema_access_profile();
        p.schemas = vec!["auth".into(), "assessment".into()];
        let out = run_scan(&s, &p, Path::new("src"), "src").unwrap();
        assert!(out.report.section("Auth Schema").is_some());
        assert!(out.report.section("Assessment Schema").is_some());
        assert!(out
            .rendered
            .contains("### `auth.users`\n\n- `src/a.ts`\n- `src/b.ts`\n"));
        assert_eq!(out.summary.files, 2);
        assert_eq!(out.summary.findings, 3);
    }

    #[test]
    fn test_schema_scan_with_plain_pattern_is_rejected_not_empty() {
        let s = MemorySearcher::new(&[("src/a.ts", "fromTable('users')")]);
        let mut p = schema_access_profile();
        p.schemas = Vec::new();
        p.patterns = vec!["fromTable".into()];
        let err = run_scan(&s, &p, Path::new("src"), "src").err().unwrap();
        assert!(matches!(err, Error::InvalidScan { .. }));
    }

    #[test]
    fn test_json_report_format() {
        let s = MemorySearcher::new(&[("src/auth/a.ts", "mock")]);
        let mut p = profile(&["mock"]);
        p.format = ReportFormat::Json;
        let out = run_scan(&s, &p, Path::new("src"), "src").unwrap();
        let v: serde_json::Value = serde_json::from_str(&out.rendered).unwrap();
        assert_eq!(v["title"], "Mock Data Usage Report");
        assert_eq!(v["sections"][1]["heading"], "Unknown Module");
    }

    #[test]
    fn test_full_pipeline_on_disk_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/assessment")).unwrap();
        std::fs::create_dir_all(root.join("src/auth")).unwrap();
        std::fs::write(
            root.join("src/assessment/loader.ts"),
            "const mockData = load();\n",
        )
        .unwrap();
        std::fs::write(
            root.join("src/auth/login.tsx"),
            "const MOCK_USER = 1;\n",
        )
        .unwrap();
        let searcher = FsSearcher::new(vec!["node_modules".into()], root);
        let p = profile(&["mock", "MOCK_"]);
        let a = run_scan(&searcher, &p, &root.join("src"), "src").unwrap();
        let b = run_scan(&searcher, &p, &root.join("src"), "src").unwrap();
        assert_eq!(a.rendered, b.rendered);
        assert!(a.rendered.contains("## Assessment Module"));
        assert!(a.rendered.contains("## Unknown Module"));
        assert!(a.rendered.contains("`src/auth/login.tsx`"));
    }

    #[test]
    fn test_missing_root_propagates() {
        let dir = tempdir().unwrap();
        let searcher = FsSearcher::new(Vec::new(), dir.path());
        let r = run_scan(
            &searcher,
            &profile(&["mock"]),
            &dir.path().join("missing"),
            "missing",
        );
        assert!(matches!(r, Err(Error::MissingRoot(_))));
    }

    #[test]
    fn test_write_reports_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/nested/out.md");
        write_reports(&[(path.clone(), "# T\n")]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# T\n");
    }

    #[test]
    fn test_write_reports_replaces_existing_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.md");
        std::fs::write(&path, "old").unwrap();
        write_reports(&[(path.clone(), "new")]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_reports_into_file_parent_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_reports(&[(blocker.join("out.md"), "x")]).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_failed_write_leaves_earlier_reports_untouched() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("reports/first.md");
        std::fs::create_dir_all(dir.path().join("reports")).unwrap();
        std::fs::write(&first, "previous run").unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let err = write_reports(&[
            (first.clone(), "this run"),
            (blocker.join("second.md"), "this run"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "previous run");
        let leftovers = std::fs::read_dir(dir.path().join("reports")).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
