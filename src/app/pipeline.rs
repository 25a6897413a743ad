//! Shared pipeline logic used by both the report and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! filter -> aggregate -> forecast -> evaluate
//!
//! The front-ends call [`run`] again on every input change and simply replace
//! the previous result.

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::{
    apply_filter, category_totals, combine, daily_totals, evaluate_naive, forecast_baselines,
    summarize,
};
use crate::domain::{
    CategoryDimension, CategoryTotal, CombinedRow, DailySeries, Dataset, Evaluation, FilterSpec,
    ForecastRow, Horizon, SalesSummary,
};
use crate::error::{PipelineError, Result};

/// All computed outputs of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub filter: FilterSpec,
    pub horizon: Horizon,
    pub filtered: Dataset,
    pub outcome: Outcome,
}

/// Whether the filtered selection had any rows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    /// Filters excluded every row; forecasting and evaluation were skipped.
    NoData,
    Analyzed(Box<Analysis>),
}

/// Everything derived from a non-empty selection.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub daily: DailySeries,
    pub by_region: Vec<CategoryTotal>,
    pub by_product: Vec<CategoryTotal>,
    pub summary: SalesSummary,
    pub forecast: Vec<ForecastRow>,
    pub combined: Vec<CombinedRow>,
    /// `None` when fewer than two daily points exist.
    pub evaluation: Option<Evaluation>,
}

impl PipelineResult {
    pub fn analysis(&self) -> Result<&Analysis> {
        match &self.outcome {
            Outcome::Analyzed(analysis) => Ok(analysis),
            Outcome::NoData => Err(PipelineError::EmptyResult),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.outcome, Outcome::NoData)
    }
}

/// Execute the full pipeline for one set of inputs.
///
/// The horizon is validated up front so that a bad control value is reported
/// even when the current selection happens to be empty.
pub fn run(dataset: &Dataset, filter: &FilterSpec, horizon: i64) -> Result<PipelineResult> {
    let horizon = Horizon::new(horizon)?;

    // 1) Filter.
    let filtered = apply_filter(dataset, filter);

    // 2) Aggregate by date; an empty series is the "no data" terminal state.
    let daily = daily_totals(&filtered);
    let Some(summary) = summarize(&filtered, &daily) else {
        warn!(records = dataset.len(), "no data for selected filters");
        return Ok(PipelineResult {
            filter: filter.clone(),
            horizon,
            filtered,
            outcome: Outcome::NoData,
        });
    };

    let by_region = category_totals(&filtered, CategoryDimension::Region);
    let by_product = category_totals(&filtered, CategoryDimension::Product);

    // 3) Forecast.
    let forecast = forecast_baselines(&daily, horizon)?;
    let combined = combine(&daily, &forecast);

    // 4) Evaluate; a single day of history has nothing to score.
    let evaluation = match evaluate_naive(&daily) {
        Ok(evaluation) => Some(evaluation),
        Err(PipelineError::InsufficientData { .. }) => None,
        Err(e) => return Err(e),
    };

    info!(
        records = filtered.len(),
        days = daily.len(),
        horizon = horizon.days(),
        evaluated = evaluation.is_some(),
        "pipeline run complete"
    );

    Ok(PipelineResult {
        filter: filter.clone(),
        horizon,
        filtered,
        outcome: Outcome::Analyzed(Box::new(Analysis {
            daily,
            by_region,
            by_product,
            summary,
            forecast,
            combined,
            evaluation,
        })),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{DateRange, Record};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn dataset() -> Dataset {
        let rows = [
            (1, "North", "Widget", 60.0),
            (1, "South", "Gadget", 40.0),
            (2, "North", "Widget", 150.0),
            (3, "South", "Widget", 90.0),
        ];
        Dataset::new(
            rows.iter()
                .map(|&(day, region, product, sales)| Record {
                    date: d(day),
                    region: region.into(),
                    product: product.into(),
                    sales,
                })
                .collect(),
        )
    }

    #[test]
    fn full_run_produces_every_output() {
        let ds = dataset();
        let result = run(&ds, &FilterSpec::unrestricted(&ds), 3).unwrap();
        let analysis = result.analysis().unwrap();

        assert_eq!(analysis.daily.values(), vec![100.0, 150.0, 90.0]);
        assert_eq!(analysis.forecast.len(), 3);
        assert_eq!(analysis.combined.len(), 6);
        assert_eq!(analysis.by_region.len(), 2);
        assert_eq!(analysis.by_product.len(), 2);
        assert_eq!(analysis.summary.peak.date, d(2));
        let eval = analysis.evaluation.as_ref().unwrap();
        assert_eq!(eval.metrics.mae, 55.0);
    }

    #[test]
    fn empty_selection_is_no_data_not_an_error() {
        let ds = dataset();
        let spec = FilterSpec::unrestricted(&ds).with_regions(["Nowhere"]);
        let result = run(&ds, &spec, 14).unwrap();

        assert!(result.is_empty());
        assert!(result.filtered.is_empty());
        assert_eq!(result.analysis().unwrap_err(), PipelineError::EmptyResult);
    }

    #[test]
    fn single_day_skips_evaluation() {
        let ds = dataset();
        let spec = FilterSpec::unrestricted(&ds).with_dates(DateRange::new(d(3), d(3)));
        let result = run(&ds, &spec, 7).unwrap();
        let analysis = result.analysis().unwrap();

        assert!(analysis.evaluation.is_none());
        assert_eq!(analysis.forecast.len(), 7);
    }

    #[test]
    fn invalid_horizon_fails_even_without_data() {
        let ds = dataset();
        assert_eq!(
            run(&ds, &FilterSpec::unrestricted(&ds), 0).unwrap_err(),
            PipelineError::InvalidHorizon(0)
        );
        let spec = FilterSpec::unrestricted(&ds).with_regions(["Nowhere"]);
        assert_eq!(run(&ds, &spec, -5).unwrap_err(), PipelineError::InvalidHorizon(-5));
    }
}
