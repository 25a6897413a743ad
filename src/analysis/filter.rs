//! Filter engine: categorical set-membership plus an inclusive date range.

use tracing::debug;

use crate::domain::{Dataset, FilterSpec};

/// Keep the records matching `spec`, preserving their original order.
///
/// An empty result is valid; the pipeline turns it into its "no data" state.
pub fn apply_filter(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let kept: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| spec.matches(record))
        .cloned()
        .collect();

    debug!(
        input = dataset.len(),
        kept = kept.len(),
        regions = spec.regions.len(),
        products = spec.products.len(),
        start = %spec.dates.start,
        end = %spec.dates.end,
        "applied filter"
    );

    Dataset::new(kept)
}
