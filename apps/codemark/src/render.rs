//! Report renderer: turns buckets or a schema index into ordered sections.
//!
//! Output is a pure function of its inputs. No clock, no environment, no
//! hash-map iteration order leaks into the text, so identical inputs render
//! byte-identical reports.

use crate::models::profile::Detail;
use crate::models::{ModuleBucket, Report, SchemaTableIndex, Section};

const NO_FINDINGS: &str =
    "No findings: none of the configured patterns matched outside excluded paths.";

const MODULE_NEXT_STEPS: &str = "\
1. Replace mock and placeholder data with calls through the data access layer.
2. Start with the modules that have the most files listed above.
3. Move fixtures that are still needed into test directories so they stop showing up here.
4. Re-run this scan after each migration batch and compare the reports.";

const SCHEMA_NEXT_STEPS: &str = "\
1. Route each direct `schema.table` reference through a repository or service function.
2. Tables referenced from many files are the best candidates for a shared accessor.
3. Keep schema names out of UI code; pass domain objects instead.
4. Re-run this scan after each refactor and compare the reports.";

/// Report header details that do not come from scan results.
#[derive(Debug, Clone)]
pub struct TitleMeta {
    pub title: String,
    pub root: String,
    pub patterns: Vec<String>,
}

/// `shared-components` -> `Shared Components`.
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn module_heading(module: &str) -> String {
    format!("{} Module", title_case(module))
}

pub fn schema_heading(schema: &str) -> String {
    format!("{} Schema", title_case(schema))
}

fn fence_lang(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => ext,
        _ => "text",
    }
}

fn overview(meta: &TitleMeta, stats: &[(String, usize)]) -> String {
    let patterns = meta
        .patterns
        .iter()
        .map(|p| format!("`{}`", p))
        .collect::<Vec<_>>()
        .join(", ");
    let mut body = format!("- Root: `{}`\n- Patterns: {}\n", meta.root, patterns);
    for (label, n) in stats {
        body.push_str(&format!("- {}: {}\n", label, n));
    }
    body
}

/// Module-oriented report: one section per non-empty bucket.
pub fn render_modules(buckets: &[ModuleBucket], meta: &TitleMeta, detail: Detail) -> Report {
    let files: usize = buckets.iter().map(|b| b.groups.len()).sum();
    let findings: usize = buckets
        .iter()
        .flat_map(|b| b.groups.iter())
        .map(|g| g.contexts.len())
        .sum();

    let mut body = overview(
        meta,
        &[
            ("Files with findings".to_string(), files),
            ("Total findings".to_string(), findings),
        ],
    );
    body.push('\n');
    if files == 0 {
        body.push_str(NO_FINDINGS);
        body.push('\n');
    } else {
        for b in buckets.iter().filter(|b| !b.groups.is_empty()) {
            body.push_str(&format!(
                "- {}: {} file(s)\n",
                module_heading(&b.module),
                b.groups.len()
            ));
        }
    }

    let mut sections = vec![Section {
        heading: "Overview".into(),
        body,
    }];

    for b in buckets.iter().filter(|b| !b.groups.is_empty()) {
        let mut body = format!("Files: {}\n", b.groups.len());
        for g in &b.groups {
            body.push_str(&format!("\n- `{}`\n\n", g.file));
            let shown: &[String] = match detail {
                Detail::All => &g.contexts,
                Detail::First => &g.contexts[..g.contexts.len().min(1)],
            };
            body.push_str(&format!("  ```{}\n", fence_lang(&g.file)));
            for c in shown {
                body.push_str(&format!("  {}\n", c));
            }
            body.push_str("  ```\n");
            let hidden = g.contexts.len() - shown.len();
            if hidden > 0 {
                body.push_str(&format!("\n  _+{} more_\n", hidden));
            }
        }
        sections.push(Section {
            heading: module_heading(&b.module),
            body,
        });
    }

    sections.push(Section {
        heading: "Next Steps".into(),
        body: MODULE_NEXT_STEPS.to_string(),
    });
    Report {
        title: meta.title.clone(),
        sections,
    }
}

/// Schema-oriented report: one section per schema, one list per table.
pub fn render_schemas(index: &SchemaTableIndex, meta: &TitleMeta) -> Report {
    let tables: usize = index.values().map(|t| t.len()).sum();
    let mut files: Vec<&str> = index
        .values()
        .flat_map(|t| t.values())
        .flat_map(|f| f.iter().map(String::as_str))
        .collect();
    files.sort_unstable();
    files.dedup();
    let references: usize = index
        .values()
        .flat_map(|t| t.values())
        .map(|f| f.len())
        .sum();

    let mut body = overview(
        meta,
        &[
            ("Schemas referenced".to_string(), index.len()),
            ("Tables referenced".to_string(), tables),
            ("Files with findings".to_string(), files.len()),
            ("Total findings".to_string(), references),
        ],
    );
    if index.is_empty() {
        body.push('\n');
        body.push_str(NO_FINDINGS);
        body.push('\n');
    }

    let mut sections = vec![Section {
        heading: "Overview".into(),
        body,
    }];
    for (schema, tables) in index {
        let mut body = format!("Tables: {}\n", tables.len());
        for (table, files) in tables {
            body.push_str(&format!("\n### `{}.{}`\n\n", schema, table));
            for f in files {
                body.push_str(&format!("- `{}`\n", f));
            }
        }
        sections.push(Section {
            heading: schema_heading(schema),
            body,
        });
    }
    sections.push(Section {
        heading: "Next Steps".into(),
        body: SCHEMA_NEXT_STEPS.to_string(),
    });
    Report {
        title: meta.title.clone(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileMatchGroup;

    fn meta() -> TitleMeta {
        TitleMeta {
            title: "Mock Data Usage Report".into(),
            root: "src".into(),
            patterns: vec!["mock".into()],
        }
    }

    fn bucket(module: &str, files: &[(&str, &[&str])]) -> ModuleBucket {
        ModuleBucket {
            module: module.into(),
            groups: files
                .iter()
                .map(|(f, ctx)| {
                    let mut g = FileMatchGroup::new(*f);
                    for c in ctx.iter() {
                        g.add_context(c);
                    }
                    g
                })
                .collect(),
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("assessment"), "Assessment");
        assert_eq!(title_case("shared-components"), "Shared Components");
        assert_eq!(title_case("user_admin panel"), "User Admin Panel");
    }

    #[test]
    fn test_module_section_lists_file_and_context() {
        let buckets = vec![
            bucket(
                "assessment",
                &[("src/assessment/loader.ts", &["const mockData = load();"])],
            ),
            bucket("auth", &[]),
        ];
        let r = render_modules(&buckets, &meta(), Detail::First);
        let headings: Vec<&str> = r.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Overview", "Assessment Module", "Next Steps"]);
        let body = &r.section("Assessment Module").unwrap().body;
        assert!(body.contains("- `src/assessment/loader.ts`"));
        assert!(body.contains("  ```ts\n  const mockData = load();\n  ```"));
    }

    #[test]
    fn test_detail_controls_context_lines() {
        let buckets = vec![bucket("auth", &[("a.ts", &["one", "two", "three"])])];
        let first = render_modules(&buckets, &meta(), Detail::First);
        let body = &first.section("Auth Module").unwrap().body;
        assert!(body.contains("one") && !body.contains("two"));
        assert!(body.contains("_+2 more_"));
        let all = render_modules(&buckets, &meta(), Detail::All);
        let body = &all.section("Auth Module").unwrap().body;
        assert!(body.contains("one") && body.contains("two") && body.contains("three"));
        assert!(!body.contains("more_"));
    }

    #[test]
    fn test_empty_report_states_no_findings() {
        let buckets = vec![bucket("auth", &[]), bucket("unknown", &[])];
        let r = render_modules(&buckets, &meta(), Detail::First);
        assert_eq!(r.sections.len(), 2);
        assert!(r.sections[0].body.contains("No findings"));
        assert_eq!(r.sections[1].heading, "Next Steps");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let buckets = vec![bucket("auth", &[("a.ts", &["x"]), ("b.ts", &["y"])])];
        let a = render_modules(&buckets, &meta(), Detail::All).to_markdown();
        let b = render_modules(&buckets, &meta(), Detail::All).to_markdown();
        assert_eq!(a, b);
    }

    #[test]
    fn test_schema_report_sections() {
        let mut index = SchemaTableIndex::new();
        index
            .entry("auth".into())
            .or_default()
            .insert("users".into(), vec!["b.ts".into(), "a.ts".into()]);
        index
            .entry("assessment".into())
            .or_default()
            .insert("results".into(), vec!["a.ts".into()]);
        let r = render_schemas(&index, &meta());
        let headings: Vec<&str> = r.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec!["Overview", "Assessment Schema", "Auth Schema", "Next Steps"]
        );
        let auth = &r.section("Auth Schema").unwrap().body;
        assert!(auth.contains("### `auth.users`\n\n- `b.ts`\n- `a.ts`\n"));
        let ov = &r.sections[0].body;
        assert!(ov.contains("- Files with findings: 2"));
        assert!(ov.contains("- Total findings: 3"));
    }

    #[test]
    fn test_fence_lang() {
        assert_eq!(fence_lang("src/a.tsx"), "tsx");
        assert_eq!(fence_lang("src.d/Makefile"), "text");
        assert_eq!(fence_lang(".env"), "text");
    }
}
