//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads and validates the sales CSV (or prompts for one)
//! - runs the filter / aggregate / forecast / evaluate pipeline
//! - prints reports and the chart
//! - writes optional exports

use clap::Parser;
use tracing::warn;

use crate::cli::{Command, DataArgs, ReportArgs, SampleArgs};
use crate::domain::{FilterSelection, RunConfig, SeriesKind};
use crate::error::{AppError, PipelineError};
use crate::io::ingest::{ValidatedDataset, load_sales_csv};

pub mod pipeline;

/// Entry point for the `sfv` binary.
pub fn run() -> Result<(), AppError> {
    // `sfv` and `sfv -f sales.csv` behave like `sfv tui ...`.
    //
    // Clap requires a subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => {
            crate::logging::init(cli.verbose);
            handle_report(args)
        }
        Command::Tui(args) => {
            // Anything below `error` would draw over the alternate screen.
            crate::logging::init_with_default(if cli.verbose > 0 { "info" } else { "error" });
            handle_tui(args)
        }
        Command::Sample(args) => {
            crate::logging::init(cli.verbose);
            handle_sample(args)
        }
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let validated = load_input(&config)?;
    report(&validated, &config)
}

/// Print the report for an already loaded dataset, then write the exports.
///
/// An empty selection prints a warning and still succeeds.
fn report(validated: &ValidatedDataset, config: &RunConfig) -> Result<(), AppError> {
    println!("{}", crate::report::format_load_summary(validated));

    let filter = config.filter.resolve(&validated.dataset);
    let result = pipeline::run(&validated.dataset, &filter, config.horizon)?;

    println!("{}", crate::report::format_run_header(&result));
    println!(
        "{}",
        crate::report::format_records(&result.filtered, config.preview_rows)
    );

    let analysis = match result.analysis() {
        Ok(analysis) => analysis,
        Err(PipelineError::EmptyResult) => {
            println!("Warning: {}", PipelineError::EmptyResult);
            return write_exports(config, &result);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", crate::report::format_analysis(analysis));

    if config.plot {
        let chart = crate::plot::render_sales_chart(
            &analysis.combined,
            &config.series,
            config.plot_width,
            config.plot_height,
        );
        println!("{chart}");
    }

    write_exports(config, &result)
}

/// Optional exports. The CSV needs data; the JSON records empty runs too.
fn write_exports(config: &RunConfig, result: &pipeline::PipelineResult) -> Result<(), AppError> {
    if let Some(path) = &config.export_json {
        crate::io::json::write_report_json(path, result)?;
    }
    if let Some(path) = &config.export_forecast {
        if result.is_empty() {
            warn!(
                path = %path.display(),
                "skipping forecast export: no data for selected filters"
            );
        } else {
            crate::io::export::write_forecast_csv(path, result)?;
        }
    }
    Ok(())
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    let path = match &args.file {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_sales_csv()?,
    };
    let validated = load_sales_csv(&path)?;
    crate::tui::run(validated.dataset, filter_selection_from_args(&args), args.horizon)
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig::new(args.start, args.days, args.seed);
    let records = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.out, &records)?;
    println!("Wrote {} row(s) to {}", records.len(), args.out.display());
    Ok(())
}

fn load_input(config: &RunConfig) -> Result<ValidatedDataset, AppError> {
    let path = match &config.csv_path {
        Some(path) => crate::cli::picker::validate_csv_path(path)?,
        None => crate::cli::picker::prompt_for_sales_csv()?,
    };
    Ok(load_sales_csv(&path)?)
}

pub fn filter_selection_from_args(args: &DataArgs) -> FilterSelection {
    FilterSelection {
        regions: args.regions.clone(),
        products: args.products.clone(),
        start: args.start,
        end: args.end,
    }
}

pub fn run_config_from_args(args: &ReportArgs) -> RunConfig {
    RunConfig {
        csv_path: args.data.file.clone(),
        filter: filter_selection_from_args(&args.data),
        horizon: args.data.horizon,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        series: if args.series.is_empty() {
            SeriesKind::ALL.to_vec()
        } else {
            args.series.clone()
        },
        preview_rows: args.rows,
        export_forecast: args.export_forecast.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so `sfv` defaults to `sfv tui`.
///
/// Rules:
/// - `sfv`                      -> `sfv tui`
/// - `sfv -f sales.csv ...`     -> `sfv tui -f sales.csv ...`
/// - `sfv --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "tui" | "sample");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["sfv"])), argv(&["sfv", "tui"]));
    }

    #[test]
    fn leading_flag_is_treated_as_tui_flag() {
        assert_eq!(
            rewrite_args(argv(&["sfv", "-f", "sales.csv"])),
            argv(&["sfv", "tui", "-f", "sales.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        for args in [
            argv(&["sfv", "report", "-f", "x.csv"]),
            argv(&["sfv", "sample", "--out", "x.csv"]),
            argv(&["sfv", "--help"]),
            argv(&["sfv", "-V"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn report_config_defaults() {
        let argv = ["sfv", "report", "-f", "sales.csv", "--no-plot"];
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        let config = run_config_from_args(&args);

        assert!(!config.plot);
        assert_eq!(config.horizon, crate::domain::DEFAULT_HORIZON);
        assert_eq!(config.series, SeriesKind::ALL.to_vec());
        assert!(config.filter.regions.is_empty());
        assert_eq!(config.filter.start, None);
    }

    fn sales() -> ValidatedDataset {
        let text = "Date,Region,Product,Sales\n\
                    2024-01-01,North,Widget,100\n\
                    2024-01-02,North,Widget,150\n\
                    2024-01-03,South,Gadget,90\n";
        let table = crate::io::ingest::read_csv(text.as_bytes()).unwrap();
        crate::io::ingest::validate(&table).unwrap()
    }

    fn config(dir: &std::path::Path, regions: &[&str]) -> RunConfig {
        RunConfig {
            csv_path: None,
            filter: FilterSelection {
                regions: regions.iter().map(|r| r.to_string()).collect(),
                ..FilterSelection::default()
            },
            horizon: 7,
            plot: true,
            plot_width: 40,
            plot_height: 8,
            series: SeriesKind::ALL.to_vec(),
            preview_rows: 5,
            export_forecast: Some(dir.join("forecast.csv")),
            export_json: Some(dir.join("report.json")),
        }
    }

    #[test]
    fn empty_selection_succeeds_and_skips_forecast_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["West"]);

        report(&sales(), &config).unwrap();

        assert!(!dir.path().join("forecast.csv").exists());
        let json = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"], "no_data");
    }

    #[test]
    fn analyzed_selection_writes_both_exports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), &["North"]);

        report(&sales(), &config).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("forecast.csv")).unwrap();
        // Header, 2 history days, 7 forecast days.
        assert_eq!(csv.lines().count(), 1 + 2 + 7);
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn invalid_horizon_fails_with_input_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            horizon: 0,
            ..config(dir.path(), &[])
        };

        let err = report(&sales(), &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!dir.path().join("report.json").exists());
    }
}
