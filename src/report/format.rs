//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{Analysis, PipelineResult};
use crate::domain::{AccuracyMetrics, CategoryTotal, Dataset, Evaluation, ForecastRow, SalesSummary};
use crate::io::ingest::ValidatedDataset;

/// Confirmation printed after a successful load.
pub fn format_load_summary(validated: &ValidatedDataset) -> String {
    format!(
        "CSV loaded successfully!\nRows: {} x Columns: {}\n",
        validated.rows, validated.columns
    )
}

/// Format the run header: active filters and horizon.
pub fn format_run_header(result: &PipelineResult) -> String {
    let mut out = String::new();
    out.push_str("=== sfv - Sales Forecast Visualizer ===\n");
    out.push_str(&format!("Regions : {}\n", fmt_selection(&result.filter.regions)));
    out.push_str(&format!("Products: {}\n", fmt_selection(&result.filter.products)));
    out.push_str(&format!(
        "Dates   : {} .. {}\n",
        result.filter.dates.start, result.filter.dates.end
    ));
    out.push_str(&format!("Horizon : {} day(s)\n", result.horizon.days()));
    out
}

/// First `limit` rows of the filtered table.
pub fn format_records(dataset: &Dataset, limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:<16} {:<16} {:>14}\n", "Date", "Region", "Product", "Sales"));
    out.push_str(&format!("{:-<10} {:-<16} {:-<16} {:->14}\n", "", "", "", ""));
    for r in dataset.records().iter().take(limit) {
        out.push_str(&format!(
            "{:<10} {:<16} {:<16} {:>14.2}\n",
            r.date,
            truncate(&r.region, 16),
            truncate(&r.product, 16),
            r.sales
        ));
    }
    if dataset.len() > limit {
        out.push_str(&format!("... {} more row(s)\n", dataset.len() - limit));
    }
    out
}

/// Total / average daily / peak day.
pub fn format_summary(summary: &SalesSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total Sales     : {}\n", fmt_currency(summary.total_sales)));
    out.push_str(&format!("Avg. Daily Sales: {}\n", fmt_currency(summary.avg_daily_sales)));
    out.push_str(&format!(
        "Highest Sale    : Peak Day: {} / Value: {}\n",
        summary.peak.date,
        fmt_currency(summary.peak.sales)
    ));
    out.push_str(&format!(
        "Records: {} | Days: {}\n",
        summary.n_records, summary.n_days
    ));
    out
}

pub fn format_category_table(title: &str, rows: &[CategoryTotal]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));
    out.push_str(&format!("{:<24} {:>16}\n", "", "Sales"));
    for row in rows {
        out.push_str(&format!(
            "{:<24} {:>16}\n",
            truncate(&row.label, 24),
            fmt_currency(row.sales)
        ));
    }
    out
}

pub fn format_forecast_table(rows: &[ForecastRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:>16} {:>18}\n", "Date", "Naive", "Moving Avg (7d)"));
    out.push_str(&format!("{:-<10} {:->16} {:->18}\n", "", "", ""));
    for row in rows {
        out.push_str(&format!(
            "{:<10} {:>16} {:>18}\n",
            row.date,
            fmt_currency(row.naive),
            fmt_currency(row.moving_average)
        ));
    }
    out
}

pub fn format_evaluation_table(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>14} {:>14} {:>14} {:>18}\n",
        "Date", "Actual", "Naive", "Abs Error", "Sq Error"
    ));
    out.push_str(&format!("{:-<10} {:->14} {:->14} {:->14} {:->18}\n", "", "", "", "", ""));
    for row in &evaluation.rows {
        out.push_str(&format!(
            "{:<10} {:>14.2} {:>14.2} {:>14.2} {:>18.2}\n",
            row.date, row.actual, row.naive_prediction, row.absolute_error, row.squared_error
        ));
    }
    out
}

pub fn format_metrics(metrics: &AccuracyMetrics) -> String {
    let mut out = String::new();
    out.push_str(&format!("MAE : {}\n", fmt_currency(metrics.mae)));
    out.push_str(&format!("RMSE: {}\n", fmt_currency(metrics.rmse)));
    out.push_str(&format!("MAPE: {}", fmt_percent(metrics.mape)));
    if metrics.mape_n < metrics.n {
        out.push_str(&format!(
            " ({} of {} day(s) with zero sales excluded)",
            metrics.n - metrics.mape_n,
            metrics.n
        ));
    }
    out.push('\n');
    out
}

/// Everything below the header for an analyzed selection.
pub fn format_analysis(analysis: &Analysis) -> String {
    let mut out = String::new();

    out.push_str(&format_summary(&analysis.summary));
    out.push('\n');
    out.push_str(&format_category_table("Sales by Product", &analysis.by_product));
    out.push('\n');
    out.push_str(&format_category_table("Sales by Region", &analysis.by_region));
    out.push('\n');

    out.push_str("Forecast (flat baselines):\n");
    out.push_str(&format_forecast_table(&analysis.forecast));
    out.push('\n');

    match &analysis.evaluation {
        Some(evaluation) => {
            out.push_str("Naive backtest (prediction = previous day):\n");
            out.push_str(&format_evaluation_table(evaluation));
            out.push('\n');
            out.push_str(&format_metrics(&evaluation.metrics));
        }
        None => out.push_str("Not enough daily points to evaluate the naive baseline (need 2).\n"),
    }

    out
}

/// `$1,234.56`, with a leading minus for negatives.
pub fn fmt_currency(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let cents = format!("{:.2}", v.abs());
    let (int_part, frac_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if v < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// `12.34%`, or `n/a` when undefined.
pub fn fmt_percent(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "n/a".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fmt_selection(set: &std::collections::BTreeSet<String>) -> String {
    if set.is_empty() {
        return "all".to_string();
    }
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
