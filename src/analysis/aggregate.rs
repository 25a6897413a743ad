//! Aggregations over a filtered dataset: daily totals, category totals, and
//! the headline summary.

use std::collections::HashMap;

use crate::domain::{
    CategoryDimension, CategoryTotal, DailyPoint, DailySeries, Dataset, SalesSummary,
};

/// Sum sales per distinct date, ascending by date.
pub fn daily_totals(dataset: &Dataset) -> DailySeries {
    dataset.records().iter().map(|r| (r.date, r.sales)).collect()
}

/// Sum sales per distinct category value, in first-appearance order.
pub fn category_totals(dataset: &Dataset, dimension: CategoryDimension) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<CategoryTotal> = Vec::new();

    for record in dataset.records() {
        let label = dimension.label_of(record);
        match index.get(label) {
            Some(&i) => out[i].sales += record.sales,
            None => {
                index.insert(label, out.len());
                out.push(CategoryTotal {
                    label: label.to_string(),
                    sales: record.sales,
                });
            }
        }
    }

    out
}

/// Highest daily total. Among equal maxima the latest date wins.
pub fn peak_day(series: &DailySeries) -> Option<DailyPoint> {
    let mut best: Option<DailyPoint> = None;
    for point in series.points() {
        match best {
            Some(b) if point.sales < b.sales => {}
            _ => best = Some(*point),
        }
    }
    best
}

/// Total, average daily and peak-day figures. `None` for an empty selection.
pub fn summarize(filtered: &Dataset, series: &DailySeries) -> Option<SalesSummary> {
    let peak = peak_day(series)?;
    Some(SalesSummary {
        total_sales: filtered.total_sales(),
        avg_daily_sales: series.total() / series.len() as f64,
        peak,
        n_days: series.len(),
        n_records: filtered.len(),
    })
}
