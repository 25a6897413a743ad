//! Write the full pipeline result as JSON.
//!
//! The JSON file is the "portable" representation of one run:
//! - the resolved filter and horizon
//! - the daily series, category totals and headline summary
//! - forecast, combined table and evaluation (when available)
//!
//! A "no data" run is written too, tagged with `"state": "no_data"`.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::app::pipeline::{Outcome, PipelineResult};
use crate::domain::FilterSpec;
use crate::error::AppError;

/// On-disk layout; the filtered rows are omitted to keep files small.
#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    tool: &'static str,
    version: &'static str,
    filter: &'a FilterSpec,
    horizon_days: usize,
    filtered_rows: usize,
    #[serde(flatten)]
    outcome: &'a Outcome,
}

/// Write `result` to `path` as pretty-printed JSON.
pub fn write_report_json(path: &Path, result: &PipelineResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create report JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, &report_file(result))
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    info!(path = %path.display(), "wrote report JSON");
    Ok(())
}

fn report_file(result: &PipelineResult) -> ReportFile<'_> {
    ReportFile {
        tool: "sfv",
        version: env!("CARGO_PKG_VERSION"),
        filter: &result.filter,
        horizon_days: result.horizon.days(),
        filtered_rows: result.filtered.len(),
        outcome: &result.outcome,
    }
}
