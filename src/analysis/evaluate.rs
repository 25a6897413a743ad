//! One-step-ahead evaluation of the naive baseline.
//!
//! For every day after the first, the prediction is the previous day's
//! actual. Day 0 has no prediction and is dropped from the table and from
//! every metric.
//!
//! | Metric | Definition |
//! |--------|------------|
//! | MAE  | mean of `|actual - prediction|` |
//! | RMSE | `sqrt(mean((actual - prediction)^2))` |
//! | MAPE | mean of `|actual - prediction| / |actual| * 100` over rows with `actual != 0` |

use tracing::debug;

use crate::domain::{AccuracyMetrics, DailySeries, Evaluation, EvaluationRow};
use crate::error::{PipelineError, Result};

/// Minimum number of daily points needed to score anything.
pub const MIN_EVALUATION_POINTS: usize = 2;

/// Backtest the lag-1 naive predictor over `series`.
pub fn evaluate_naive(series: &DailySeries) -> Result<Evaluation> {
    if series.len() < MIN_EVALUATION_POINTS {
        return Err(PipelineError::InsufficientData {
            needed: MIN_EVALUATION_POINTS,
            got: series.len(),
        });
    }

    let rows: Vec<EvaluationRow> = series
        .points()
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            let error = cur.sales - prev.sales;
            EvaluationRow {
                date: cur.date,
                actual: cur.sales,
                naive_prediction: prev.sales,
                absolute_error: error.abs(),
                squared_error: error * error,
            }
        })
        .collect();

    let metrics = AccuracyMetrics {
        mae: mae(&rows),
        rmse: rmse(&rows),
        mape: mape(&rows),
        n: rows.len(),
        mape_n: rows.iter().filter(|r| r.actual != 0.0).count(),
    };

    debug!(
        n = metrics.n,
        mae = metrics.mae,
        rmse = metrics.rmse,
        mape = ?metrics.mape,
        "evaluated naive baseline"
    );

    Ok(Evaluation { rows, metrics })
}

/// Mean absolute error over `rows`.
pub fn mae(rows: &[EvaluationRow]) -> f64 {
    rows.iter().map(|r| r.absolute_error).sum::<f64>() / rows.len() as f64
}

/// Root mean squared error over `rows`.
pub fn rmse(rows: &[EvaluationRow]) -> f64 {
    (rows.iter().map(|r| r.squared_error).sum::<f64>() / rows.len() as f64).sqrt()
}

/// Mean absolute percentage error, in percent.
///
/// Rows whose actual is exactly zero are excluded (not substituted), which
/// shrinks the denominator. `None` if no row remains.
pub fn mape(rows: &[EvaluationRow]) -> Option<f64> {
    let terms: Vec<f64> = rows
        .iter()
        .filter(|r| r.actual != 0.0)
        .map(|r| r.absolute_error / r.actual.abs() * 100.0)
        .collect();
    if terms.is_empty() {
        return None;
    }
    Some(terms.iter().sum::<f64>() / terms.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(values: &[f64]) -> DailySeries {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (d(1 + i as u32), *v))
            .collect()
    }

    #[test]
    fn three_day_example() {
        let eval = evaluate_naive(&series(&[100.0, 150.0, 90.0])).unwrap();

        assert_eq!(eval.rows.len(), 2);
        assert_eq!(eval.rows[0].date, d(2));
        assert_eq!(eval.rows[0].naive_prediction, 100.0);
        assert_eq!(eval.rows[0].absolute_error, 50.0);
        assert_eq!(eval.rows[0].squared_error, 2500.0);
        assert_eq!(eval.rows[1].naive_prediction, 150.0);
        assert_eq!(eval.rows[1].absolute_error, 60.0);
        assert_eq!(eval.rows[1].squared_error, 3600.0);

        let m = eval.metrics;
        assert_relative_eq!(m.mae, 55.0);
        assert_relative_eq!(m.rmse, 3050.0_f64.sqrt());
        assert_relative_eq!(m.rmse, 55.2268, epsilon = 1e-4);
        assert_relative_eq!(m.mape.unwrap(), 50.0, epsilon = 1e-9);
        assert_eq!(m.n, 2);
        assert_eq!(m.mape_n, 2);
    }

    #[test]
    fn zero_actual_is_excluded_from_mape_only() {
        // predictions: 10, 0, 20 ; actuals: 0, 20, 30
        let eval = evaluate_naive(&series(&[10.0, 0.0, 20.0, 30.0])).unwrap();
        let m = eval.metrics;

        // errors: 10, 20, 10
        assert_relative_eq!(m.mae, 40.0 / 3.0);
        assert_relative_eq!(m.rmse, (600.0_f64 / 3.0).sqrt());
        // MAPE over the two non-zero actuals: 20/20*100, 10/30*100
        assert_relative_eq!(m.mape.unwrap(), (100.0 + 100.0 / 3.0) / 2.0, epsilon = 1e-9);
        assert_eq!(m.n, 3);
        assert_eq!(m.mape_n, 2);
    }

    #[test]
    fn all_zero_actuals_leave_mape_undefined() {
        let eval = evaluate_naive(&series(&[5.0, 0.0, 0.0])).unwrap();
        assert_eq!(eval.metrics.mape, None);
        assert_eq!(eval.metrics.mape_n, 0);
        assert_relative_eq!(eval.metrics.mae, 2.5);
    }

    #[test]
    fn negative_actuals_use_absolute_denominator() {
        let eval = evaluate_naive(&series(&[10.0, -10.0])).unwrap();
        assert_relative_eq!(eval.metrics.mape.unwrap(), 200.0);
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert_eq!(
            evaluate_naive(&series(&[1.0])).unwrap_err(),
            PipelineError::InsufficientData { needed: 2, got: 1 }
        );
        assert_eq!(
            evaluate_naive(&DailySeries::default()).unwrap_err(),
            PipelineError::InsufficientData { needed: 2, got: 0 }
        );
    }
}
