//! Pipeline stages downstream of ingest.
//!
//! - `filter`: region/product/date predicates
//! - `aggregate`: daily and per-category totals, headline summary
//! - `forecast`: naive and moving-average baselines
//! - `evaluate`: lag-1 naive backtest and MAE/RMSE/MAPE

pub mod aggregate;
pub mod evaluate;
pub mod filter;
pub mod forecast;

pub use aggregate::{category_totals, daily_totals, peak_day, summarize};
pub use evaluate::evaluate_naive;
pub use filter::apply_filter;
pub use forecast::{combine, forecast_baselines};
