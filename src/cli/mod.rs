//! Command-line parsing for the sales forecast visualizer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{DEFAULT_HORIZON, HORIZON_UI_MAX, SeriesKind};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "sfv",
    version,
    about = "Sales Forecast Visualizer (CSV in, baseline forecasts out)"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a sales CSV, print summaries, forecasts and accuracy, and optionally plot/export.
    Report(ReportArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same underlying pipeline as `sfv report`, but re-runs it on
    /// every control change and renders results with Ratatui.
    Tui(DataArgs),
    /// Write a synthetic sales CSV for trying the tool out.
    Sample(SampleArgs),
}

/// Input file, filter selections and forecast horizon.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Sales CSV with Date, Region, Product and Sales columns. Prompts when omitted.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Keep only these regions (repeatable). Default: all regions.
    #[arg(long = "region", value_name = "REGION")]
    pub regions: Vec<String>,

    /// Keep only these products (repeatable). Default: all products.
    #[arg(long = "product", value_name = "PRODUCT")]
    pub products: Vec<String>,

    /// First day to include (YYYY-MM-DD). Default: earliest date in the file.
    #[arg(long, value_parser = parse_cli_date)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD). Default: latest date in the file.
    #[arg(long, value_parser = parse_cli_date)]
    pub end: Option<NaiveDate>,

    /// Days to forecast past the last observed date (at most 60).
    ///
    /// Non-positive values are accepted here and rejected by the pipeline.
    #[arg(
        long,
        default_value_t = DEFAULT_HORIZON,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(..=HORIZON_UI_MAX)
    )]
    pub horizon: i64,
}

/// Options for the non-interactive report.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Render an ASCII chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Series to draw (repeatable). Default: all.
    #[arg(long = "series", value_enum)]
    pub series: Vec<SeriesKind>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Rows of the filtered table to preview.
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Export the combined actual + forecast table to CSV.
    #[arg(long = "export-forecast", value_name = "CSV")]
    pub export_forecast: Option<PathBuf>,

    /// Export the full run (summary, forecast, evaluation) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for synthetic sample generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of consecutive days to generate.
    #[arg(long, default_value_t = 120)]
    pub days: usize,

    /// Random seed (same seed, same file).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First generated day (YYYY-MM-DD).
    #[arg(long, value_parser = parse_cli_date, default_value = "2024-01-01")]
    pub start: NaiveDate,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s).map_err(|reason| format!("{reason} (expected YYYY-MM-DD)"))
}
