//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the data source (live sheet or offline sample)
//! - runs the load -> clean -> filter -> aggregate pipeline
//! - hands results to the report printer or the TUI

use std::collections::HashSet;

use clap::Parser;

use crate::cli::{Command, RunArgs};
use crate::data::DataSource;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `adash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `adash` and `adash --sample` to behave like `adash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Tui(args) => crate::tui::run(&args),
    }
}

fn handle_report(args: RunArgs) -> Result<(), AppError> {
    let mut source = DataSource::from_args(&args)?;
    let cleaned = pipeline::load_and_clean(&mut source)?;

    let selected: HashSet<String> = if args.campaigns.is_empty() {
        cleaned.campaigns.iter().cloned().collect()
    } else {
        args.campaigns.iter().cloned().collect()
    };

    let data = pipeline::recompute(&cleaned.records, &selected);

    println!(
        "{}",
        crate::report::format_run_summary(&cleaned, &selected, &source.describe())
    );
    println!("{}", crate::report::format_dashboard(&data));

    Ok(())
}

/// Rewrite argv so `adash` defaults to `adash tui`.
///
/// Rules:
/// - `adash`                     -> `adash tui`
/// - `adash --sample ...`        -> `adash tui --sample ...`
/// - `adash --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["adash"])), argv(&["adash", "tui"]));
    }

    #[test]
    fn leading_flag_gets_tui_inserted() {
        assert_eq!(
            rewrite_args(argv(&["adash", "--sample"])),
            argv(&["adash", "tui", "--sample"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["adash", "report", "--sample"])),
            argv(&["adash", "report", "--sample"])
        );
        assert_eq!(rewrite_args(argv(&["adash", "--help"])), argv(&["adash", "--help"]));
    }
}
