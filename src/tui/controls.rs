//! Dashboard control state.
//!
//! Kept free of any terminal types so key handling can be tested directly.
//! Every mutating method returns `true` when a pipeline input changed.

use chrono::{Days, NaiveDate};

use crate::domain::{
    DateRange, Dataset, FilterSelection, FilterSpec, HORIZON_UI_MAX, HORIZON_UI_MIN, SeriesKind,
};

/// Which control has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Regions,
    Products,
    Start,
    End,
    Horizon,
    Series,
}

impl Field {
    const ORDER: [Field; 6] = [
        Field::Regions,
        Field::Products,
        Field::Start,
        Field::End,
        Field::Horizon,
        Field::Series,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Controls {
    pub field: Field,
    /// All labels present in the loaded dataset (sorted).
    pub region_options: Vec<String>,
    pub product_options: Vec<String>,
    pub region_cursor: usize,
    pub product_cursor: usize,
    pub series_cursor: usize,
    /// Observed min/max date; `None` for a dataset without rows.
    pub bounds: Option<(NaiveDate, NaiveDate)>,
    pub filter: FilterSpec,
    pub horizon: i64,
    /// Enabled chart series, always in `SeriesKind::ALL` order.
    pub series: Vec<SeriesKind>,
}

impl Controls {
    pub fn new(dataset: &Dataset, selection: &FilterSelection, horizon: i64) -> Self {
        Self {
            field: Field::Regions,
            region_options: dataset.regions(),
            product_options: dataset.products(),
            region_cursor: 0,
            product_cursor: 0,
            series_cursor: 0,
            bounds: dataset.date_bounds(),
            filter: selection.resolve(dataset),
            // Non-positive values are left for the pipeline to reject.
            horizon: horizon.min(HORIZON_UI_MAX),
            series: SeriesKind::ALL.to_vec(),
        }
    }

    pub fn focus_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn focus_prev(&mut self) {
        self.field = self.field.prev();
    }

    /// Move the cursor inside the focused list.
    pub fn move_cursor(&mut self, delta: isize) {
        let (cursor, len) = match self.field {
            Field::Regions => (&mut self.region_cursor, self.region_options.len()),
            Field::Products => (&mut self.product_cursor, self.product_options.len()),
            Field::Series => (&mut self.series_cursor, SeriesKind::ALL.len()),
            _ => return,
        };
        if len == 0 {
            return;
        }
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Toggle the item under the cursor of the focused list.
    pub fn toggle(&mut self) -> bool {
        match self.field {
            Field::Regions => toggle_label(
                &mut self.filter.regions,
                self.region_options.get(self.region_cursor),
            ),
            Field::Products => toggle_label(
                &mut self.filter.products,
                self.product_options.get(self.product_cursor),
            ),
            Field::Series => {
                let Some(kind) = SeriesKind::ALL.get(self.series_cursor).copied() else {
                    return false;
                };
                let enabled = !self.series.contains(&kind);
                self.series = SeriesKind::ALL
                    .into_iter()
                    .filter(|k| if *k == kind { enabled } else { self.series.contains(k) })
                    .collect();
                // Chart-only; the pipeline result does not depend on it.
                false
            }
            _ => false,
        }
    }

    /// Drop every region/product restriction and reset dates to the observed range.
    pub fn reset_filters(&mut self) -> bool {
        let dates = self
            .bounds
            .map(|(start, end)| DateRange::new(start, end))
            .unwrap_or_else(DateRange::unbounded);
        let changed = !self.filter.regions.is_empty()
            || !self.filter.products.is_empty()
            || self.filter.dates != dates;
        self.filter.regions.clear();
        self.filter.products.clear();
        self.filter.dates = dates;
        changed
    }

    /// Left/right on a scalar field: dates move by one day, horizon by one.
    pub fn adjust(&mut self, delta: i64) -> bool {
        match self.field {
            Field::Start => shift_within(&mut self.filter.dates.start, delta, self.bounds),
            Field::End => shift_within(&mut self.filter.dates.end, delta, self.bounds),
            Field::Horizon => {
                let next = self.horizon.saturating_add(delta).clamp(HORIZON_UI_MIN, HORIZON_UI_MAX);
                let changed = next != self.horizon;
                self.horizon = next;
                changed
            }
            _ => false,
        }
    }
}

fn toggle_label(set: &mut std::collections::BTreeSet<String>, label: Option<&String>) -> bool {
    let Some(label) = label else {
        return false;
    };
    if !set.remove(label) {
        set.insert(label.clone());
    }
    true
}

/// Move `date` by `delta` days, staying inside the observed bounds.
fn shift_within(date: &mut NaiveDate, delta: i64, bounds: Option<(NaiveDate, NaiveDate)>) -> bool {
    let Some((min, max)) = bounds else {
        return false;
    };
    let step = Days::new(delta.unsigned_abs());
    let moved = if delta >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    };
    let next = moved.unwrap_or(*date).max(min).min(max);
    let changed = next != *date;
    *date = next;
    changed
}
