//! Export the combined history + forecast table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use tracing::info;

use crate::app::pipeline::PipelineResult;
use crate::error::AppError;

const HEADER: [&str; 4] = ["Date", "Actual", "Naive", "MovingAverage"];

/// Write `Date,Actual,Naive,MovingAverage` rows; empty cells where a series has no value.
pub fn write_forecast_csv(path: &Path, result: &PipelineResult) -> Result<(), AppError> {
    let analysis = result.analysis()?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &analysis.combined {
        writer
            .write_record([
                row.date.to_string(),
                fmt_cell(row.actual),
                fmt_cell(row.naive),
                fmt_cell(row.moving_average),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), rows = analysis.combined.len(), "wrote forecast CSV");
    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.4}")).unwrap_or_default()
}
