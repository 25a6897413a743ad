//! Data sources besides user uploads.
//!
//! - synthetic sales sample generation (`sample`)

pub mod sample;

pub use sample::{SampleConfig, generate_sample, write_sample_csv};
