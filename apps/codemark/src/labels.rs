//! Issue-tracker label synchronization.
//!
//! Each label is created or updated through a `LabelClient`. The shipped
//! client shells out to `gh label create --force`, which updates in place
//! when the label already exists. Without `write` nothing is sent and the
//! actions only describe what would happen.

use crate::error::{Error, Result};
use crate::models::profile::ModuleRule;
use serde::{Deserialize, Serialize};
use std::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl Label {
    pub fn new(name: &str, color: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        }
    }
}

/// Create-or-update seam for the external tracker.
pub trait LabelClient {
    fn upsert(&mut self, label: &Label) -> Result<()>;
}

/// `gh` CLI client; `repo` maps to `--repo OWNER/NAME`.
pub struct GhCli {
    pub repo: Option<String>,
}

impl GhCli {
    pub fn new(repo: Option<String>) -> Self {
        Self { repo }
    }

    fn args(&self, label: &Label) -> Vec<String> {
        let mut args = vec![
            "label".to_string(),
            "create".to_string(),
            label.name.clone(),
            "--color".to_string(),
            label.color.clone(),
            "--description".to_string(),
            label.description.clone(),
            "--force".to_string(),
        ];
        if let Some(r) = self.repo.as_ref() {
            args.push("--repo".to_string());
            args.push(r.clone());
        }
        args
    }
}

impl LabelClient for GhCli {
    fn upsert(&mut self, label: &Label) -> Result<()> {
        let args = self.args(label);
        debug!(label = %label.name, "gh {}", args.join(" "));
        let out = Command::new("gh")
            .args(&args)
            .output()
            .map_err(|e| Error::Label {
                name: label.name.clone(),
                message: format!("failed to run gh: {}", e),
            })?;
        if out.status.success() {
            Ok(())
        } else {
            Err(Error::Label {
                name: label.name.clone(),
                message: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelAction {
    pub name: String,
    pub color: String,
    pub wrote: bool,
}

/// Normalize `#AbC123` to `abc123`; `None` unless six hex digits.
pub fn normalize_color(color: &str) -> Option<String> {
    let c = color.trim().trim_start_matches('#');
    if c.len() == 6 && c.chars().all(|ch| ch.is_ascii_hexdigit()) {
        Some(c.to_ascii_lowercase())
    } else {
        None
    }
}

/// Built-in label set: finding categories plus one label per module name.
pub fn default_labels(modules: &[ModuleRule]) -> Vec<Label> {
    let mut out = vec![
        Label::new("mock-data", "fbca04", "Code still reads mock or placeholder data"),
        Label::new(
            "direct-schema-access",
            "d93f0b",
            "Code references schema.table directly instead of the data layer",
        ),
        Label::new("needs-migration", "0e8a16", "Scheduled for migration to real data"),
    ];
    for m in modules {
        let name = format!("module:{}", m.name);
        if !out.iter().any(|l| l.name == name) {
            out.push(Label::new(
                &name,
                "1d76db",
                &format!("Files in the {} module", m.name),
            ));
        }
    }
    out
}

/// Upsert every label, continuing past failures.
pub fn run_label_sync<C: LabelClient + ?Sized>(
    client: &mut C,
    labels: &[Label],
    write: bool,
) -> (Vec<LabelAction>, Vec<String>) {
    let mut actions = Vec::new();
    let mut errors = Vec::new();
    for l in labels {
        let Some(color) = normalize_color(&l.color) else {
            errors.push(format!("label '{}': invalid color '{}'", l.name, l.color));
            continue;
        };
        let label = Label {
            color: color.clone(),
            ..l.clone()
        };
        let mut wrote = false;
        if write {
            match client.upsert(&label) {
                Ok(()) => wrote = true,
                Err(e) => {
                    warn!("{}", e);
                    errors.push(e.to_string());
                    continue;
                }
            }
        }
        actions.push(LabelAction {
            name: l.name.clone(),
            color,
            wrote,
        });
    }
    (actions, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Label>,
        fail_on: Option<String>,
    }

    impl LabelClient for Recorder {
        fn upsert(&mut self, label: &Label) -> Result<()> {
            if self.fail_on.as_deref() == Some(label.name.as_str()) {
                return Err(Error::Label {
                    name: label.name.clone(),
                    message: "HTTP 403".into(),
                });
            }
            self.seen.push(label.clone());
            Ok(())
        }
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#FBCA04").as_deref(), Some("fbca04"));
        assert_eq!(normalize_color("0e8a16").as_deref(), Some("0e8a16"));
        assert_eq!(normalize_color("red"), None);
        assert_eq!(normalize_color("#12345"), None);
    }

    #[test]
    fn test_dry_run_does_not_call_client() {
        let mut rec = Recorder::default();
        let labels = vec![Label::new("a", "#000000", "")];
        let (actions, errors) = run_label_sync(&mut rec, &labels, false);
        assert!(rec.seen.is_empty());
        assert!(errors.is_empty());
        assert_eq!(actions.len(), 1);
        assert!(!actions[0].wrote);
    }

    #[test]
    fn test_write_upserts_and_continues_past_failures() {
        let mut rec = Recorder {
            fail_on: Some("b".into()),
            ..Default::default()
        };
        let labels = vec![
            Label::new("a", "#AAAAAA", "first"),
            Label::new("b", "bbbbbb", "second"),
            Label::new("bad", "nope", ""),
            Label::new("c", "cccccc", "third"),
        ];
        let (actions, errors) = run_label_sync(&mut rec, &labels, true);
        let names: Vec<&str> = rec.seen.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(rec.seen[0].color, "aaaaaa");
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| a.wrote));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("invalid color")));
        assert!(errors.iter().any(|e| e.contains("HTTP 403")));
    }

    #[test]
    fn test_default_labels_cover_modules_once() {
        let modules = vec![
            ModuleRule::new("login", "auth"),
            ModuleRule::new("session", "auth"),
            ModuleRule::new("assessment", "assessment"),
        ];
        let labels = default_labels(&modules);
        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "mock-data",
                "direct-schema-access",
                "needs-migration",
                "module:auth",
                "module:assessment"
            ]
        );
        assert!(labels.iter().all(|l| normalize_color(&l.color).is_some()));
    }

    #[test]
    fn test_gh_args() {
        let gh = GhCli::new(Some("acme/web".into()));
        let args = gh.args(&Label::new("x", "ffffff", "d"));
        assert_eq!(
            args,
            vec![
                "label",
                "create",
                "x",
                "--color",
                "ffffff",
                "--description",
                "d",
                "--force",
                "--repo",
                "acme/web"
            ]
        );
    }
}
