//! Console rendering for scan, list, and labels commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::error::ScanWarning;
use crate::labels::LabelAction;
use crate::models::profile::{Grouping, ScanProfile};
use crate::models::ScanSummary;
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn print_json(v: &JsonVal) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{}", s),
        Err(_) => println!("{}", v),
    }
}

/// Print one line per scan plus skipped-path warnings.
pub fn print_scans(results: &[ScanSummary], warnings: &[ScanWarning], output: &str) {
    match output {
        "json" => print_json(&compose_scans_json(results, warnings)),
        _ => {
            let color = use_colors(output);
            for w in warnings {
                if color {
                    eprintln!(
                        "{} {} ({})",
                        "⚠ skipped:".yellow().bold(),
                        w.path,
                        w.message
                    );
                } else {
                    eprintln!("⚠ skipped: {} ({})", w.path, w.message);
                }
            }
            for r in results {
                let counts = format!("files={} findings={}", r.files, r.findings);
                if color {
                    println!(
                        "{} {} {} ❲{}❳",
                        "📝 wrote:".green().bold(),
                        r.report.bold(),
                        counts,
                        r.scan
                    );
                } else {
                    println!("📝 wrote: {} {} ❲{}❳", r.report, counts, r.scan);
                }
            }
            let summary = format!(
                "— Summary — scans={} files={} findings={} skipped={}",
                results.len(),
                results.iter().map(|r| r.files).sum::<usize>(),
                results.iter().map(|r| r.findings).sum::<usize>(),
                warnings.len()
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print configured scans.
pub fn print_list(scans: &[ScanProfile], output: &str) {
    match output {
        "json" => print_json(&compose_list_json(scans)),
        _ => {
            let color = use_colors(output);
            for s in scans {
                let grouping = match s.grouping {
                    Grouping::Module => "module",
                    Grouping::Schema => "schema",
                };
                if color {
                    println!(
                        "{} {} -> {} [{}]",
                        "◆".blue(),
                        s.name.bold(),
                        s.out,
                        grouping
                    );
                } else {
                    println!("◆ {} -> {} [{}]", s.name, s.out, grouping);
                }
            }
        }
    }
}

/// Print label sync results. Errors go to stderr in human mode.
pub fn print_labels(actions: &[LabelAction], errors: &[String], output: &str) {
    match output {
        "json" => print_json(&compose_labels_json(actions, errors)),
        _ => {
            let color = use_colors(output);
            for a in actions {
                let verb = if a.wrote { "🏷️  synced:" } else { "👀 would sync:" };
                if color {
                    println!("{} {} (#{})", verb.green().bold(), a.name, a.color);
                } else {
                    println!("{} {} (#{})", verb, a.name, a.color);
                }
            }
            for e in errors {
                if color {
                    eprintln!("{} {}", "✖".red(), e);
                } else {
                    eprintln!("✖ {}", e);
                }
            }
        }
    }
}

/// Compose scan JSON object (pure) for testing/snapshot purposes.
pub fn compose_scans_json(results: &[ScanSummary], warnings: &[ScanWarning]) -> JsonVal {
    let summary = json!({
        "scans": results.len(),
        "files": results.iter().map(|r| r.files).sum::<usize>(),
        "findings": results.iter().map(|r| r.findings).sum::<usize>(),
        "skipped": warnings.len(),
    });
    json!({"results": results, "warnings": warnings, "summary": summary})
}

pub fn compose_list_json(scans: &[ScanProfile]) -> JsonVal {
    json!({ "scans": scans })
}

pub fn compose_labels_json(actions: &[LabelAction], errors: &[String]) -> JsonVal {
    let summary = json!({
        "wrote": actions.iter().filter(|a| a.wrote).count(),
        "total": actions.len(),
        "errors": errors.len(),
    });
    json!({"results": actions, "errors": errors, "summary": summary})
}
