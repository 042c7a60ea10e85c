//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "codemark",
    version,
    about = "Codemark: find, group, and report pattern hits in a source tree",
    long_about = "Codemark walks a source tree, finds lines matching configured patterns, groups them per file and per module (or per schema/table), and writes a Markdown report.\n\nConfiguration precedence: CLI > codemark.toml > defaults.",
    after_help = "Examples:\n  codemark scan\n  codemark scan mock-data --detail all\n  codemark scan schema-access --stdout\n  codemark labels --repo acme/web --write",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current codemark version."
    )]
    Version,
    /// Run scans and write reports
    #[command(
        about = "Run scans",
        long_about = "Run one named scan, or every configured scan when no name is given, and write each report. Zero findings is a normal outcome.",
        after_help = "Examples:\n  codemark scan\n  codemark scan mock-data --root src --out docs/mock.md"
    )]
    Scan {
        #[arg(help = "Scan name (default: all configured scans)")]
        name: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Directory to scan, relative to the repository root")]
        root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Context lines per file: first|all")]
        detail: Option<String>,
        #[arg(long, help = "Report path override (single scan only)")]
        out: Option<String>,
        #[arg(
            long,
            action = clap::ArgAction::SetTrue,
            help = "Print the report instead of writing it"
        )]
        stdout: bool,
    },
    /// List configured scans
    #[command(
        about = "List scans",
        long_about = "List built-in and configured scans with their report paths."
    )]
    List {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Sync issue-tracker labels
    #[command(
        about = "Sync labels",
        long_about = "Create or update issue-tracker labels through the gh CLI. Without --write this is a dry run.",
        after_help = "Examples:\n  codemark labels\n  codemark labels --repo acme/web --write"
    )]
    Labels {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(
            long,
            help = "Target repository OWNER/NAME (default: gh's current repo)"
        )]
        repo: Option<String>,
        #[arg(
            long,
            action = clap::ArgAction::SetTrue,
            help = "Apply changes via gh"
        )]
        write: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
