//! `sales-forecast` library crate.
//!
//! The binary (`sfv`) is a thin wrapper around this library so that:
//!
//! - the filter / aggregate / forecast / evaluate pipeline is testable without a terminal
//! - the report and dashboard front-ends share one implementation

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
