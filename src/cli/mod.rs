//! Command-line parsing for the neutral real rate proxies.
//!
//! Argument parsing and command dispatch stay separate from the rate math.
//! Data-source settings fall back to `NR_*` environment variables (a `.env`
//! file is loaded before parsing).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::data::{
    DEFAULT_FOCUS_URL, DEFAULT_GAP_SHEET, DEFAULT_GAP_SKIP_ROWS, DEFAULT_GAP_URL, DEFAULT_SGS_URL, DEFAULT_TESOURO_URL,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "nr", version, about = "Brazilian neutral real interest rate proxies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the five proxy charts, print summaries and plots, optionally export.
    Run(RunArgs),
    /// Same computation as `run`, summaries only (useful for scripting).
    Summary(RunArgs),
    /// Plot chart frames written by `nr run --export-dir`.
    Plot(PlotArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Use deterministic synthetic inputs instead of the live sources.
    #[arg(long)]
    pub offline: bool,

    /// Number of quarters of synthetic survey history (with --offline).
    #[arg(long, default_value_t = 24)]
    pub offline_quarters: usize,

    /// Fetch date recorded on the inputs (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    #[arg(long, env = "NR_FOCUS_URL", default_value = DEFAULT_FOCUS_URL)]
    pub focus_url: String,

    #[arg(long, env = "NR_SGS_URL", default_value = DEFAULT_SGS_URL)]
    pub sgs_url: String,

    #[arg(long, env = "NR_TESOURO_URL", default_value = DEFAULT_TESOURO_URL)]
    pub tesouro_url: String,

    /// Inflation Report workbook with the official output gap (URL or local `.xlsx`).
    #[arg(long, env = "NR_GAP_URL", default_value = DEFAULT_GAP_URL)]
    pub gap_url: String,

    /// Worksheet of the workbook holding the output-gap chart data.
    #[arg(long, env = "NR_GAP_SHEET", default_value = DEFAULT_GAP_SHEET)]
    pub gap_sheet: String,

    /// CSV extraction of the gap sheet, read instead of the workbook.
    #[arg(long, env = "NR_GAP_CSV", value_name = "CSV")]
    pub gap_csv: Option<PathBuf>,

    /// Title/notes rows above the header row of the gap sheet.
    #[arg(long, env = "NR_GAP_SKIP_ROWS", default_value_t = DEFAULT_GAP_SKIP_ROWS)]
    pub gap_skip_rows: usize,

    /// Persist run outputs here and reuse them on later runs.
    #[arg(long, env = "NR_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Ignore (and replace) any cached output for this run.
    #[arg(long)]
    pub refresh: bool,

    /// Empty the cache directory before running.
    #[arg(long)]
    pub clear_cache: bool,

    /// Skip the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write every chart frame as CSV plus a JSON bundle into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

/// Options for plotting saved chart frames.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Chart frame CSV (`period,proxy,value`).
    #[arg(long, value_name = "CSV", required_unless_present = "bundle", conflicts_with = "bundle")]
    pub frame: Option<PathBuf>,

    /// JSON bundle of a whole run (`proxies.json`).
    #[arg(long, value_name = "JSON")]
    pub bundle: Option<PathBuf>,

    /// Chart to draw from the bundle (proxy1, proxy2_high, ...); all when omitted.
    #[arg(long, requires = "bundle")]
    pub chart: Option<String>,

    /// Chart title for a frame CSV (defaults to the file stem).
    #[arg(long, conflicts_with = "bundle")]
    pub title: Option<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
