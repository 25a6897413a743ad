//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated input rows and datasets (`Record`, `Dataset`)
//! - user selections (`FilterSpec`, `Horizon`, `SeriesKind`)
//! - pipeline outputs (`DailySeries`, `ForecastRow`, `Evaluation`, etc.)

pub mod types;

pub use types::*;
