//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - combined table export (CSV) (`export`)
//! - full run report (JSON) (`json`)

pub mod export;
pub mod ingest;
pub mod json;

pub use export::*;
pub use ingest::*;
pub use json::*;
