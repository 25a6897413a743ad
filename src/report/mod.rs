//! Reporting utilities: formatted summaries and tables for terminal output.

pub mod format;

pub use format::*;
