//! Codemark CLI binary entry point.
//! Delegates to the library for scan/list/labels and prints results.

mod logging;

use clap::Parser;
use codemark::cli::{Cli, Commands};
use codemark::config::{self, Effective};
use codemark::labels::{run_label_sync, GhCli};
use codemark::matcher::FsSearcher;
use codemark::models::profile::{Detail, ScanProfile};
use codemark::pipeline::{run_scan, write_reports, ScanOutcome};
use codemark::utils::{error_prefix, note_prefix, warn_prefix};
use codemark::{output, Error, Result};
use std::path::PathBuf;

fn main() {
    logging::init_logger();
    let cli = Cli::parse();
    let code = match run(cli.cmd) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            2
        }
    };
    std::process::exit(code);
}

fn run(cmd: Commands) -> Result<i32> {
    match cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Scan {
            name,
            repo_root,
            root,
            output,
            detail,
            out,
            stdout,
        } => {
            let detail = match detail.as_deref() {
                None => None,
                Some(d) => match Detail::parse(d) {
                    Some(d) => Some(d),
                    None => {
                        eprintln!(
                            "{} invalid --detail '{}' (expected first|all)",
                            error_prefix(),
                            d
                        );
                        return Ok(2);
                    }
                },
            };
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                root.as_deref(),
                output.as_deref(),
                detail,
            )?;
            note_missing_config(&eff);
            let mut profiles: Vec<ScanProfile> = match name.as_deref() {
                Some(n) => vec![eff.scan(n)?.clone()],
                None => eff.scans.clone(),
            };
            if let Some(o) = out {
                if profiles.len() != 1 {
                    eprintln!("{} --out needs a scan name", error_prefix());
                    return Ok(2);
                }
                profiles[0].out = o;
            }
            scan(&eff, &profiles, stdout)
        }
        Commands::List { repo_root, output } => {
            let eff =
                config::resolve_effective(repo_root.as_deref(), None, output.as_deref(), None)?;
            note_missing_config(&eff);
            output::print_list(&eff.scans, &eff.output);
            Ok(0)
        }
        Commands::Labels {
            repo_root,
            repo,
            write,
            output,
        } => {
            let eff =
                config::resolve_effective(repo_root.as_deref(), None, output.as_deref(), None)?;
            note_missing_config(&eff);
            let mut client = GhCli::new(repo.or(eff.label_repo.clone()));
            let (actions, errors) = run_label_sync(&mut client, &eff.labels, write);
            output::print_labels(&actions, &errors, &eff.output);
            Ok(if errors.is_empty() { 0 } else { 1 })
        }
    }
}

fn note_missing_config(eff: &Effective) {
    if eff.config_path.is_none() && eff.output != "json" {
        eprintln!("{} No codemark.toml found; using defaults.", note_prefix());
    }
}

/// Run every profile, then write (or print) all reports.
///
/// Rendering finishes for every scan before anything is written, and the
/// writes themselves are staged so a failure leaves old reports in place.
fn scan(eff: &Effective, profiles: &[ScanProfile], to_stdout: bool) -> Result<i32> {
    if !eff.root.exists() {
        return Err(Error::MissingRoot(eff.root.clone()));
    }
    let searcher = FsSearcher::new(eff.exclude_dirs.clone(), &eff.repo_root);

    let mut outcomes: Vec<(PathBuf, ScanOutcome)> = Vec::new();
    for p in profiles {
        let outcome = run_scan(&searcher, p, &eff.root, &eff.root_label)?;
        outcomes.push((eff.report_path(p), outcome));
    }

    let mut warnings = Vec::new();
    for (_, o) in &outcomes {
        for w in &o.warnings {
            if !warnings.contains(w) {
                warnings.push(w.clone());
            }
        }
    }

    if to_stdout {
        for (_, o) in &outcomes {
            print!("{}", o.rendered);
        }
        for w in &warnings {
            eprintln!("{} skipped {} ({})", warn_prefix(), w.path, w.message);
        }
        return Ok(0);
    }

    let reports: Vec<(PathBuf, &str)> = outcomes
        .iter()
        .map(|(path, o)| (path.clone(), o.rendered.as_str()))
        .collect();
    write_reports(&reports)?;
    let summaries: Vec<_> = outcomes.into_iter().map(|(_, o)| o.summary).collect();
    output::print_scans(&summaries, &warnings, &eff.output);
    Ok(0)
}
