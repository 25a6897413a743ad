//! Plotters-powered sales chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Days, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; x values are
/// day offsets from `x_origin`.
pub struct SalesPlottersChart<'a> {
    /// Historical daily totals.
    pub actual: &'a [(f64, f64)],
    /// Naive forecast (flat line at the last observed value).
    pub naive: &'a [(f64, f64)],
    /// Trailing moving-average forecast.
    pub moving_average: &'a [(f64, f64)],
    pub x_origin: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Line colors shared with the legend in the chart title.
pub const ACTUAL_COLOR: (u8, u8, u8) = (0, 255, 255);
pub const NAIVE_COLOR: (u8, u8, u8) = (255, 215, 0);
pub const MOVING_AVERAGE_COLOR: (u8, u8, u8) = (255, 0, 255);

impl<'a> Widget for SalesPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let finite = x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite();
        if !finite || x1 <= x0 || y1 <= y0 {
            return;
        }

        let origin = self.x_origin;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_day_offset(origin, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let (r, g, b) = ACTUAL_COLOR;
            chart.draw_series(LineSeries::new(self.actual.iter().copied(), &RGBColor(r, g, b)))?;
            let (r, g, b) = NAIVE_COLOR;
            chart.draw_series(LineSeries::new(self.naive.iter().copied(), &RGBColor(r, g, b)))?;
            let (r, g, b) = MOVING_AVERAGE_COLOR;
            chart.draw_series(LineSeries::new(
                self.moving_average.iter().copied(),
                &RGBColor(r, g, b),
            ))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// `MM-DD` label for a fractional day offset (rounded to the nearest day).
pub fn fmt_day_offset(origin: NaiveDate, offset: f64) -> String {
    if !offset.is_finite() || offset < 0.0 {
        return String::new();
    }
    origin
        .checked_add_days(Days::new(offset.round() as u64))
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_offsets_format_as_month_day() {
        let origin = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        assert_eq!(fmt_day_offset(origin, 0.0), "02-27");
        assert_eq!(fmt_day_offset(origin, 2.4), "02-29");
        assert_eq!(fmt_day_offset(origin, 3.0), "03-01");
        assert_eq!(fmt_day_offset(origin, -1.0), "");
    }
}
