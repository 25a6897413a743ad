//! Flat baseline forecasts.
//!
//! Two projections are produced for every future day:
//!
//! - **naive**: the last observed daily total
//! - **moving average**: the mean of the last `min(7, n)` daily totals
//!
//! Both are constant over the horizon; neither extrapolates a trend.

use chrono::Days;
use tracing::debug;

use crate::domain::{CombinedRow, DailySeries, ForecastRow, Horizon, MOVING_AVERAGE_WINDOW};
use crate::error::{PipelineError, Result};

/// Project `horizon` days past the last date of `series`.
pub fn forecast_baselines(series: &DailySeries, horizon: Horizon) -> Result<Vec<ForecastRow>> {
    let last = series.last().ok_or(PipelineError::InsufficientData {
        needed: 1,
        got: 0,
    })?;

    let values = series.values();
    let naive = last.sales;
    let moving_average = trailing_mean(&values, MOVING_AVERAGE_WINDOW);

    // Checked before any row is built; the final date bounds all the others.
    last.date
        .checked_add_days(Days::new(horizon.days() as u64))
        .ok_or(PipelineError::DateOverflow {
            last: last.date,
            horizon: horizon.days(),
        })?;

    let rows: Vec<ForecastRow> = (1..=horizon.days() as u64)
        .map_while(|step| last.date.checked_add_days(Days::new(step)))
        .map(|date| ForecastRow {
            date,
            naive,
            moving_average,
        })
        .collect();

    debug!(
        horizon = horizon.days(),
        last_date = %last.date,
        naive,
        moving_average,
        "built baseline forecast"
    );

    Ok(rows)
}

/// Mean of the last `min(window, values.len())` values.
///
/// Returns `NaN` for an empty slice; callers only pass non-empty series.
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let n = window.min(values.len());
    let tail = &values[values.len() - n..];
    tail.iter().sum::<f64>() / n as f64
}

/// History rows (actual only) followed by forecast rows (baselines only).
pub fn combine(series: &DailySeries, forecast: &[ForecastRow]) -> Vec<CombinedRow> {
    let history = series.points().iter().map(|p| CombinedRow {
        date: p.date,
        actual: Some(p.sales),
        naive: None,
        moving_average: None,
    });
    let future = forecast.iter().map(|f| CombinedRow {
        date: f.date,
        actual: None,
        naive: Some(f.naive),
        moving_average: Some(f.moving_average),
    });
    history.chain(future).collect()
}
