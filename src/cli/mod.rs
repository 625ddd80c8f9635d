//! Command-line parsing for the campaign dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline/aggregation code.

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "adash", version, about = "Ad campaign performance dashboard (Sheets-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline once and print KPIs, tables, and the funnel.
    Report(RunArgs),
    /// Launch the interactive terminal dashboard.
    ///
    /// This uses the same underlying pipeline as `adash report`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(RunArgs),
}

/// Common options for both front-ends.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Worksheet (tab) name inside the configured spreadsheet.
    #[arg(short = 'w', long, default_value = "May-June Dashboard")]
    pub worksheet: String,

    /// Restrict to these campaigns (repeatable). Default: all campaigns.
    #[arg(short = 'c', long = "campaign", value_name = "NAME")]
    pub campaigns: Vec<String>,

    /// How long the raw worksheet fetch stays cached, in seconds.
    #[arg(long, default_value_t = 3600)]
    pub cache_ttl: u64,

    /// Use a deterministic offline sample instead of fetching the sheet.
    #[arg(long)]
    pub sample: bool,

    /// Seed for --sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
