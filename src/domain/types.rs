//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages in-memory
//! - exported to JSON/CSV
//! - rendered by the report and TUI front-ends

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Columns every upload must carry (after header trimming).
pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Region", "Product", "Sales"];

/// The only accepted date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trailing window of the moving-average baseline.
pub const MOVING_AVERAGE_WINDOW: usize = 7;

/// Horizon bounds offered by the interactive controls.
pub const HORIZON_UI_MIN: i64 = 7;
pub const HORIZON_UI_MAX: i64 = 60;
pub const DEFAULT_HORIZON: i64 = 30;

/// One validated input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    /// Kept as-is: zero or negative values are not clamped.
    pub sales: f64,
}

/// An ordered sequence of validated records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(|r| r.sales).sum()
    }

    /// Observed `(min, max)` date, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Sorted distinct region labels.
    pub fn regions(&self) -> Vec<String> {
        self.distinct(|r| &r.region)
    }

    /// Sorted distinct product labels.
    pub fn products(&self) -> Vec<String> {
        self.distinct(|r| &r.product)
    }

    fn distinct(&self, key: impl Fn(&Record) -> &String) -> Vec<String> {
        self.records
            .iter()
            .map(|r| key(r).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The widest representable range.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Resolved filter selections. Empty sets mean "no restriction".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub regions: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub dates: DateRange,
}

impl FilterSpec {
    /// Select everything in `dataset` (date range = observed min/max).
    pub fn unrestricted(dataset: &Dataset) -> Self {
        let dates = dataset
            .date_bounds()
            .map(|(start, end)| DateRange::new(start, end))
            .unwrap_or_else(DateRange::unbounded);
        Self {
            regions: BTreeSet::new(),
            products: BTreeSet::new(),
            dates,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dates(mut self, dates: DateRange) -> Self {
        self.dates = dates;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        (self.regions.is_empty() || self.regions.contains(&record.region))
            && (self.products.is_empty() || self.products.contains(&record.product))
            && self.dates.contains(record.date)
    }
}

/// A validated, strictly positive forecast horizon (days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Horizon(usize);

impl Horizon {
    pub fn new(days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(PipelineError::InvalidHorizon(days));
        }
        usize::try_from(days)
            .map(Self)
            .map_err(|_| PipelineError::InvalidHorizon(days))
    }

    pub fn days(self) -> usize {
        self.0
    }
}

impl TryFrom<i64> for Horizon {
    type Error = PipelineError;

    fn try_from(days: i64) -> Result<Self> {
        Horizon::new(days)
    }
}

/// One entry of a [`DailySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub sales: f64,
}

/// Total sales per distinct date, strictly increasing by date.
///
/// The only way to build one is by summing `(date, sales)` pairs, so the
/// ordering invariant holds by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl FromIterator<(NaiveDate, f64)> for DailySeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        let mut totals = std::collections::BTreeMap::<NaiveDate, f64>::new();
        for (date, sales) in iter {
            *totals.entry(date).or_insert(0.0) += sales;
        }
        Self {
            points: totals
                .into_iter()
                .map(|(date, sales)| DailyPoint { date, sales })
                .collect(),
        }
    }
}

impl DailySeries {
    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DailyPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DailyPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.sales).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.sales).sum()
    }
}

/// Which categorical column to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CategoryDimension {
    Region,
    Product,
}

impl CategoryDimension {
    pub fn column_name(self) -> &'static str {
        match self {
            CategoryDimension::Region => "Region",
            CategoryDimension::Product => "Product",
        }
    }

    pub fn label_of(self, record: &Record) -> &str {
        match self {
            CategoryDimension::Region => &record.region,
            CategoryDimension::Product => &record.product,
        }
    }
}

/// Summed sales of one category value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub label: String,
    pub sales: f64,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub avg_daily_sales: f64,
    /// Highest daily total; ties resolve to the latest date.
    pub peak: DailyPoint,
    pub n_days: usize,
    pub n_records: usize,
}

/// One future day of the baseline forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub naive: f64,
    pub moving_average: f64,
}

/// History followed by forecast, for charting. Historical rows carry only
/// `actual`, forecast rows only `naive`/`moving_average`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedRow {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub naive: Option<f64>,
    pub moving_average: Option<f64>,
}

impl CombinedRow {
    pub fn value(&self, kind: SeriesKind) -> Option<f64> {
        match kind {
            SeriesKind::Actual => self.actual,
            SeriesKind::Naive => self.naive,
            SeriesKind::MovingAverage => self.moving_average,
        }
    }
}

/// One scored day of the lag-1 naive backtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub naive_prediction: f64,
    pub absolute_error: f64,
    pub squared_error: f64,
}

/// Scalar accuracy of the naive baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub rmse: f64,
    /// `None` when every scored actual is zero.
    pub mape: Option<f64>,
    /// Rows scored for MAE/RMSE.
    pub n: usize,
    /// Rows that contributed a MAPE term (`actual != 0`).
    pub mape_n: usize,
}

/// Evaluation table plus its metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub rows: Vec<EvaluationRow>,
    pub metrics: AccuracyMetrics,
}

/// Which series to draw on the sales chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesKind {
    Actual,
    Naive,
    MovingAverage,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [
        SeriesKind::Actual,
        SeriesKind::Naive,
        SeriesKind::MovingAverage,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Actual => "Sales",
            SeriesKind::Naive => "Naive",
            SeriesKind::MovingAverage => "Moving Avg (7d)",
        }
    }

    pub fn glyph(self) -> char {
        match self {
            SeriesKind::Actual => '*',
            SeriesKind::Naive => 'n',
            SeriesKind::MovingAverage => 'm',
        }
    }
}

/// Filter selections as typed by the user, before resolution against a dataset.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub regions: Vec<String>,
    pub products: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterSelection {
    /// Resolve against `dataset`: missing bounds default to the observed min/max.
    pub fn resolve(&self, dataset: &Dataset) -> FilterSpec {
        let base = FilterSpec::unrestricted(dataset);
        let dates = DateRange::new(
            self.start.unwrap_or(base.dates.start),
            self.end.unwrap_or(base.dates.end),
        );
        base.with_regions(self.regions.iter().cloned())
            .with_products(self.products.iter().cloned())
            .with_dates(dates)
    }
}

/// Report/run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: Option<PathBuf>,
    pub filter: FilterSelection,
    pub horizon: i64,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub series: Vec<SeriesKind>,
    /// Rows of the filtered table to preview.
    pub preview_rows: usize,
    pub export_forecast: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
