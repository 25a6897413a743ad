//! End-to-end runs: CSV text in, pipeline results and exports out.

use std::io::Write;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use tempfile::NamedTempFile;

use sales_forecast::analysis::apply_filter;
use sales_forecast::app::pipeline::{Outcome, run};
use sales_forecast::domain::{DateRange, FilterSelection, FilterSpec};
use sales_forecast::error::PipelineError;
use sales_forecast::io::ingest::{load_sales_csv, read_csv, validate};

const SALES_CSV: &str = "\
Sales,Product,Region,Date,Channel
60,Widget,North,2024-01-01,web
40,Gadget,South,2024-01-01,store
150,Widget,North,2024-01-02,web
45,Gadget,South,2024-01-03,store
45,Widget,North,2024-01-03,web
";

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn write_csv(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn full_run_matches_worked_example() {
    let file = write_csv(SALES_CSV);
    let validated = load_sales_csv(file.path()).unwrap();
    assert_eq!(validated.rows, 5);
    assert_eq!(validated.columns, 5);

    let filter = FilterSelection::default().resolve(&validated.dataset);
    let result = run(&validated.dataset, &filter, 3).unwrap();
    let analysis = result.analysis().unwrap();

    // Daily totals: 100, 150, 90.
    let values: Vec<f64> = analysis.daily.points().iter().map(|p| p.sales).collect();
    assert_eq!(values, vec![100.0, 150.0, 90.0]);

    let forecast_dates: Vec<NaiveDate> = analysis.forecast.iter().map(|r| r.date).collect();
    assert_eq!(forecast_dates, vec![d(4), d(5), d(6)]);
    for row in &analysis.forecast {
        assert_relative_eq!(row.naive, 90.0);
        assert_relative_eq!(row.moving_average, 340.0 / 3.0, epsilon = 1e-9);
    }

    let metrics = &analysis.evaluation.as_ref().unwrap().metrics;
    assert_relative_eq!(metrics.mae, 55.0);
    assert_relative_eq!(metrics.rmse, 3050.0_f64.sqrt(), epsilon = 1e-9);
    assert_relative_eq!(metrics.mape.unwrap(), 50.0, epsilon = 1e-9);

    assert_eq!(analysis.summary.peak.date, d(2));
    assert_eq!(analysis.combined.len(), 6);
}

#[test]
fn missing_columns_fail_validation() {
    let table = read_csv("Date,Region,Amount\n2024-01-01,North,5\n".as_bytes()).unwrap();
    let err = validate(&table).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Schema {
            missing: vec!["Product".into(), "Sales".into()]
        }
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn filters_that_exclude_everything_yield_no_data() {
    let validated = validate(&read_csv(SALES_CSV.as_bytes()).unwrap()).unwrap();
    let selection = FilterSelection {
        regions: vec!["West".into()],
        ..FilterSelection::default()
    };
    let filter = selection.resolve(&validated.dataset);

    let result = run(&validated.dataset, &filter, 30).unwrap();
    assert!(matches!(result.outcome, Outcome::NoData));
    assert_eq!(result.analysis().unwrap_err(), PipelineError::EmptyResult);
}

#[test]
fn daily_totals_preserve_filtered_sum() {
    let validated = validate(&read_csv(SALES_CSV.as_bytes()).unwrap()).unwrap();
    let specs = [
        FilterSpec::unrestricted(&validated.dataset),
        FilterSpec::unrestricted(&validated.dataset).with_products(["Widget"]),
        FilterSpec::unrestricted(&validated.dataset).with_dates(DateRange::new(d(2), d(3))),
        FilterSpec::unrestricted(&validated.dataset).with_regions(["South"]),
    ];

    for spec in &specs {
        let result = run(&validated.dataset, spec, 7).unwrap();
        let analysis = result.analysis().unwrap();
        assert_relative_eq!(analysis.daily.total(), result.filtered.total_sales(), epsilon = 1e-9);

        let once = apply_filter(&validated.dataset, spec);
        assert_eq!(apply_filter(&once, spec), once);
    }
}

#[test]
fn exports_write_combined_table_and_json() {
    let validated = validate(&read_csv(SALES_CSV.as_bytes()).unwrap()).unwrap();
    let filter = FilterSpec::unrestricted(&validated.dataset);
    let result = run(&validated.dataset, &filter, 2).unwrap();

    let csv_out = NamedTempFile::new().unwrap();
    sales_forecast::io::write_forecast_csv(csv_out.path(), &result).unwrap();
    let text = std::fs::read_to_string(csv_out.path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Actual,Naive,MovingAverage");
    assert_eq!(lines.len(), 1 + 3 + 2);
    assert!(lines[4].starts_with("2024-01-04,,90.0000,"));

    let json_out = NamedTempFile::new().unwrap();
    sales_forecast::io::write_report_json(json_out.path(), &result).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_out.path()).unwrap()).unwrap();
    assert_eq!(value["state"], "analyzed");
    assert_eq!(value["horizon_days"], 2);
}

#[test]
fn bad_horizon_and_bad_dates_are_input_errors() {
    let validated = validate(&read_csv(SALES_CSV.as_bytes()).unwrap()).unwrap();
    let filter = FilterSpec::unrestricted(&validated.dataset);
    assert_eq!(
        run(&validated.dataset, &filter, -1).unwrap_err(),
        PipelineError::InvalidHorizon(-1)
    );

    let file = write_csv("Date,Region,Product,Sales\n2024-13-01,North,Widget,5\n");
    let err = load_sales_csv(file.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Format { line: 2, .. }));
}
